//! Scoped transaction helper for mutating store operations.
//!
//! # Invariants
//! - Commit happens only after the unit of work returns `Ok`.
//! - Any error rolls the transaction back before it is returned.
//! - A failed `COMMIT` is rolled back by `Transaction`'s drop behavior.

use super::user_repo::{StoreError, StoreResult};
use crate::db::DbError;
use log::{error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Attaches the failing store operation to low-level SQLite errors.
pub(crate) trait StorageContext<T> {
    fn during(self, operation: &'static str) -> StoreResult<T>;
}

impl<T, E> StorageContext<T> for Result<T, E>
where
    E: Into<DbError>,
{
    fn during(self, operation: &'static str) -> StoreResult<T> {
        self.map_err(|err| StoreError::Storage {
            operation,
            source: err.into(),
        })
    }
}

/// Runs `work` inside one immediate transaction on `conn`.
///
/// The transaction handle is owned here and handed to `work` by reference,
/// so it cannot escape the call.
pub(crate) fn run_in_transaction<T>(
    conn: &Connection,
    operation: &'static str,
    work: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
) -> StoreResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).during(operation)?;

    match work(&tx) {
        Ok(value) => {
            if let Err(err) = tx.commit() {
                error!("event={operation} module=repo status=error error_code=commit_failed error={err}");
                return Err(StoreError::Storage {
                    operation,
                    source: err.into(),
                });
            }
            Ok(value)
        }
        Err(err) => {
            warn!(
                "event={operation} module=repo status=rollback reason={}",
                err.kind()
            );
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event={operation} module=repo status=error error_code=rollback_failed error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_in_transaction, StorageContext};
    use crate::db::open_db_in_memory;
    use crate::repo::user_repo::StoreError;
    use rusqlite::Connection;

    fn count_users(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
            .unwrap()
    }

    const INSERT_SQL: &str = "INSERT INTO users (name, email, age, created_at)
        VALUES ('a', 'a@x', 5, '2024-01-01');";

    #[test]
    fn successful_work_is_committed() {
        let conn = open_db_in_memory().unwrap();

        run_in_transaction(&conn, "test_commit", |tx| {
            tx.execute_batch(INSERT_SQL).during("test_commit")
        })
        .unwrap();

        assert!(conn.is_autocommit());
        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn failed_work_is_rolled_back_and_error_returned_unchanged() {
        let conn = open_db_in_memory().unwrap();

        let err = run_in_transaction(&conn, "test_rollback", |tx| -> Result<(), _> {
            tx.execute_batch(INSERT_SQL).during("test_rollback")?;
            Err(StoreError::NotFound(9))
        })
        .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(9)));
        assert!(conn.is_autocommit());
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn statement_failure_is_wrapped_with_operation() {
        let conn = open_db_in_memory().unwrap();

        let err = run_in_transaction(&conn, "test_bad_sql", |tx| {
            tx.execute_batch("INSERT INTO missing_table VALUES (1);")
                .during("test_bad_sql")
        })
        .unwrap_err();

        match err {
            StoreError::Storage { operation, .. } => assert_eq!(operation, "test_bad_sql"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(conn.is_autocommit());
    }
}
