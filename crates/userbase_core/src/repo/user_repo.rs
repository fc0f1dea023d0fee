//! User store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over the `users` table.
//! - Keep SQL and transaction demarcation inside the persistence boundary.
//!
//! # Invariants
//! - `create`, `update` and `delete` each run in one immediate transaction.
//! - `update` checks existence and overwrites in the same transaction.
//! - `delete` of a missing id is a committed no-op, not an error.
//! - Read paths reject invalid persisted rows instead of masking them: one
//!   row breaking a record rule fails the whole `find_all`.

use super::unit_of_work::{run_in_transaction, StorageContext};
use crate::db::schema::{current_user_version, SCHEMA_VERSION};
use crate::db::DbError;
use crate::mapper::UserMapper;
use crate::model::user::{User, UserId, UserView, MAX_AGE, MIN_AGE};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    age,
    created_at
FROM users";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "name", "email", "age", "created_at"];

const OP_CREATE: &str = "user_create";
const OP_FIND_ALL: &str = "user_find_all";
const OP_FIND_BY_ID: &str = "user_find_by_id";
const OP_UPDATE: &str = "user_update";
const OP_DELETE: &str = "user_delete";
const OP_OPEN: &str = "user_store_open";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by user store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The backing store failed while running `operation`.
    Storage {
        operation: &'static str,
        source: DbError,
    },
    /// No user row has the given id.
    NotFound(UserId),
    /// Persisted or supplied data breaks a record invariant.
    InvalidData(String),
    /// Connection schema is not at the version this store expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    /// Short stable label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Storage { .. } => "storage",
            Self::NotFound(_) => "not_found",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage { operation, source } => {
                write!(f, "storage failure during {operation}: {source}")
            }
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "user store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "user store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Persistence contract used by the user service.
///
/// Implementations may target any relational engine; the service only
/// relies on the semantics documented per method.
pub trait UserStore {
    /// Inserts `user` and assigns the generated id to it.
    fn create(&self, user: &mut User) -> StoreResult<UserId>;
    /// Returns every persisted user.
    fn find_all(&self) -> StoreResult<Vec<UserView>>;
    fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    /// Merges `patch` into the stored user and returns the stored result.
    ///
    /// Fails with [`StoreError::NotFound`] when `id` does not exist.
    fn update(&self, id: UserId, patch: &User) -> StoreResult<User>;
    /// Removes the user; a missing id is not an error.
    fn delete(&self, id: UserId) -> StoreResult<()>;
}

impl<S: UserStore + ?Sized> UserStore for &S {
    fn create(&self, user: &mut User) -> StoreResult<UserId> {
        (**self).create(user)
    }

    fn find_all(&self) -> StoreResult<Vec<UserView>> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        (**self).find_by_id(id)
    }

    fn update(&self, id: UserId, patch: &User) -> StoreResult<User> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: UserId) -> StoreResult<()> {
        (**self).delete(id)
    }
}

/// SQLite-backed user store.
///
/// Borrows a connection owned by the caller, who is responsible for
/// closing it.
pub struct SqliteUserStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserStore<'conn> {
    /// Constructs a store from a connection prepared by `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        debug!("event={OP_OPEN} module=repo status=ok");
        Ok(Self { conn })
    }
}

impl UserStore for SqliteUserStore<'_> {
    fn create(&self, user: &mut User) -> StoreResult<UserId> {
        if let Some(existing) = user.id {
            return Err(StoreError::InvalidData(format!(
                "user already persisted with id {existing}"
            )));
        }

        let started_at = Instant::now();
        let id = run_in_transaction(self.conn, OP_CREATE, |tx| {
            tx.execute(
                "INSERT INTO users (name, email, age, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.name.as_str(),
                    user.email.as_str(),
                    user.age,
                    user.created_at,
                ],
            )
            .during(OP_CREATE)?;
            Ok(tx.last_insert_rowid())
        })?;

        user.id = Some(id);
        info!(
            "event={OP_CREATE} module=repo status=ok id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    fn find_all(&self) -> StoreResult<Vec<UserView>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))
            .during(OP_FIND_ALL)?;
        let rows = stmt.query_map([], read_user_row).during(OP_FIND_ALL)?;

        let mut users = Vec::new();
        for row in rows {
            let user = check_persisted(row.during(OP_FIND_ALL)?)?;
            users.push(UserMapper.to_view(&user));
        }

        debug!("event={OP_FIND_ALL} module=repo status=ok count={}", users.len());
        Ok(users)
    }

    fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = select_user(self.conn, id, OP_FIND_BY_ID)?;
        debug!(
            "event={OP_FIND_BY_ID} module=repo status=ok id={id} found={}",
            user.is_some()
        );
        Ok(user)
    }

    fn update(&self, id: UserId, patch: &User) -> StoreResult<User> {
        let started_at = Instant::now();
        let updated = run_in_transaction(self.conn, OP_UPDATE, |tx| {
            let Some(mut existing) = select_user(tx, id, OP_UPDATE)? else {
                return Err(StoreError::NotFound(id));
            };
            UserMapper.merge(&mut existing, patch);

            tx.execute(
                "UPDATE users
                 SET
                    name = ?2,
                    email = ?3,
                    age = ?4,
                    created_at = ?5
                 WHERE id = ?1;",
                params![
                    id,
                    existing.name.as_str(),
                    existing.email.as_str(),
                    existing.age,
                    existing.created_at,
                ],
            )
            .during(OP_UPDATE)?;

            select_user(tx, id, OP_UPDATE)?.ok_or_else(|| {
                StoreError::InvalidData(format!("user {id} missing after update read-back"))
            })
        })?;

        info!(
            "event={OP_UPDATE} module=repo status=ok id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(updated)
    }

    fn delete(&self, id: UserId) -> StoreResult<()> {
        let started_at = Instant::now();
        let removed = run_in_transaction(self.conn, OP_DELETE, |tx| {
            tx.execute("DELETE FROM users WHERE id = ?1;", [id])
                .during(OP_DELETE)
        })?;

        if removed == 0 {
            warn!("event={OP_DELETE} module=repo status=noop id={id} reason=not_found");
        } else {
            info!(
                "event={OP_DELETE} module=repo status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
        }
        Ok(())
    }
}

fn select_user(conn: &Connection, id: UserId, operation: &'static str) -> StoreResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            read_user_row,
        )
        .optional()
        .during(operation)?;

    user.map(check_persisted).transpose()
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        age: row.get("age")?,
        created_at: row.get("created_at")?,
    })
}

/// Applies the record rules that do not depend on the current date.
fn check_persisted(user: User) -> StoreResult<User> {
    match user.id {
        Some(id) if id > 0 => {}
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid id `{other:?}` in users.id"
            )));
        }
    }

    if user.name.trim().is_empty() {
        return Err(StoreError::InvalidData("blank value in users.name".to_string()));
    }

    if !user.email.contains('@') {
        return Err(StoreError::InvalidData(
            "value without `@` in users.email".to_string(),
        ));
    }

    if !(MIN_AGE..=MAX_AGE).contains(&user.age) {
        return Err(StoreError::InvalidData(format!(
            "invalid age `{}` in users.age",
            user.age
        )));
    }

    Ok(user)
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let actual_version = current_user_version(conn).during(OP_OPEN)?;
    if actual_version != SCHEMA_VERSION {
        return Err(StoreError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }

    if !table_exists(conn, "users")? {
        return Err(StoreError::MissingRequiredTable("users"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "users", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .during(OP_OPEN)?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .during(OP_OPEN)?;
    let mut rows = stmt.query([]).during(OP_OPEN)?;
    while let Some(row) = rows.next().during(OP_OPEN)? {
        let current: String = row.get(1).during(OP_OPEN)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
