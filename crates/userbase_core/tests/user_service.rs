use chrono::NaiveDate;
use std::cell::Cell;
use userbase_core::db::open_db_in_memory;
use userbase_core::{
    ServiceError, SqliteUserStore, StoreResult, User, UserId, UserMapper, UserRequest,
    UserService, UserStore, UserValidator, UserView, ValidationError,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn ivan() -> UserRequest {
    UserRequest::new("Ivan", "ivan@example.com", 25, today())
}

/// Store wrapper counting every call that reaches storage.
struct CountingStore<S> {
    inner: S,
    calls: Cell<usize>,
    deletes: Cell<usize>,
}

impl<S> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
            deletes: Cell::new(0),
        }
    }

    fn touch(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl<S: UserStore> UserStore for CountingStore<S> {
    fn create(&self, user: &mut User) -> StoreResult<UserId> {
        self.touch();
        self.inner.create(user)
    }

    fn find_all(&self) -> StoreResult<Vec<UserView>> {
        self.touch();
        self.inner.find_all()
    }

    fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.touch();
        self.inner.find_by_id(id)
    }

    fn update(&self, id: UserId, patch: &User) -> StoreResult<User> {
        self.touch();
        self.inner.update(id, patch)
    }

    fn delete(&self, id: UserId) -> StoreResult<()> {
        self.touch();
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete(id)
    }
}

fn service_for(store: SqliteUserStore<'_>) -> UserService<CountingStore<SqliteUserStore<'_>>> {
    UserService::with_collaborators(
        CountingStore::new(store),
        UserValidator::with_today(today()),
        UserMapper,
    )
}

#[test]
fn create_then_read_returns_request_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    let created = service.create_user(&ivan()).unwrap();
    let loaded = service.read_user_by_id(created.id).unwrap();

    assert!(created.id > 0);
    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Ivan");
    assert_eq!(loaded.email, "ivan@example.com");
    assert_eq!(loaded.age, 25);
    assert_eq!(loaded.created_at, today());
}

#[test]
fn blank_name_is_rejected_before_store_access() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    let mut request = ivan();
    request.name = Some("  ".to_string());
    let err = service.create_user(&request).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::BlankName)
    ));
    assert_eq!(service.store().calls.get(), 0);
}

#[test]
fn update_with_invalid_age_is_rejected_before_store_access() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    let mut request = ivan();
    request.age = Some(150);
    let err = service.update_user(1_i64, &request).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::AgeOutOfRange(150))
    ));
    assert_eq!(service.store().calls.get(), 0);
}

#[test]
fn invalid_ids_are_rejected_before_store_access() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    assert!(matches!(
        service.read_user_by_id(0_i64),
        Err(ServiceError::Validation(ValidationError::InvalidId(Some(0))))
    ));
    assert!(matches!(
        service.delete_user(-1_i64),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service.update_user(None::<i64>, &ivan()),
        Err(ServiceError::Validation(ValidationError::InvalidId(None)))
    ));
    assert_eq!(service.store().calls.get(), 0);
}

#[test]
fn read_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    let err = service.read_user_by_id(77_i64).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(77)));
    assert_eq!(err.to_string(), "user with id 77 not found");
}

#[test]
fn update_unknown_id_returns_not_found_and_keeps_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());
    service.create_user(&ivan()).unwrap();
    let before = service.read_all_users().unwrap().len();

    let err = service.update_user(500_i64, &ivan()).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(500)));
    assert_eq!(service.read_all_users().unwrap().len(), before);
}

#[test]
fn service_delete_is_strict_while_store_delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());
    let created = service.create_user(&ivan()).unwrap();

    service.delete_user(created.id).unwrap();
    let err = service.delete_user(created.id).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(id) if id == created.id));
    assert_eq!(service.store().deletes.get(), 1);
    service.store().delete(created.id).unwrap();
}

#[test]
fn read_all_lists_every_user() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());
    assert!(service.read_all_users().unwrap().is_empty());

    service.create_user(&ivan()).unwrap();
    service
        .create_user(&UserRequest::new("Olga", "olga@example.com", 40, today()))
        .unwrap();

    let names: Vec<_> = service
        .read_all_users()
        .unwrap()
        .into_iter()
        .map(|view| view.name)
        .collect();
    assert_eq!(names, vec!["Ivan".to_string(), "Olga".to_string()]);
}

#[test]
fn create_update_delete_scenario() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());

    let created = service.create_user(&ivan()).unwrap();
    assert_eq!(created.age, 25);
    assert_eq!(created.email, "ivan@example.com");

    let update = UserRequest::new("New", "new@example.com", 45, today());
    let updated = service.update_user(created.id, &update).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.age, 45);
    assert_eq!(updated.name, "New");

    service.delete_user(created.id).unwrap();
    assert!(matches!(
        service.read_user_by_id(created.id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn storage_failure_is_reported_with_cause() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(SqliteUserStore::try_new(&conn).unwrap());
    conn.execute_batch(
        "CREATE TRIGGER reject_insert BEFORE INSERT ON users
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .unwrap();

    let err = service.create_user(&ivan()).unwrap_err();

    assert!(matches!(err, ServiceError::Storage(_)));
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().contains("user_create"));
}

#[test]
fn default_service_accepts_todays_date() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserStore::try_new(&conn).unwrap());
    let today = UserValidator::new().today();

    let created = service
        .create_user(&UserRequest::new("Ivan", "ivan@example.com", 25, today))
        .unwrap();
    assert_eq!(created.created_at, today);
}
