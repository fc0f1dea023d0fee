//! Core domain logic for Userbase.
//! This crate owns person-record validation, mapping and persistence.

pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use mapper::UserMapper;
pub use model::user::{
    CreateUserRequest, UpdateUserRequest, User, UserId, UserRequest, UserView,
};
pub use repo::user_repo::{SqliteUserStore, StoreError, StoreResult, UserStore};
pub use service::user_service::{ServiceError, UserService};
pub use validation::{UserValidator, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
