//! User use-case service.
//!
//! # Responsibility
//! - Provide the five CRUD entry points used by front ends.
//! - Translate store failures into caller-facing error kinds.
//!
//! # Invariants
//! - Requests and ids are validated before any store call.
//! - `delete_user` fails on a missing id even though the store's delete
//!   is idempotent.
//! - The service never logs-and-swallows; every failure is returned.

use crate::mapper::UserMapper;
use crate::model::user::{UserId, UserRequest, UserView};
use crate::repo::user_repo::{StoreError, UserStore};
use crate::validation::{UserValidator, ValidationError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing error for user use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input violated a field or identifier constraint. Storage untouched.
    Validation(ValidationError),
    /// Referenced id does not resolve to a stored user.
    NotFound(UserId),
    /// Backing store failure; `source()` returns the cause.
    Storage(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user with id {id} not found"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Use-case facade over an injected store, validator and mapper.
pub struct UserService<S: UserStore> {
    store: S,
    validator: UserValidator,
    mapper: UserMapper,
}

impl<S: UserStore> UserService<S> {
    /// Creates a service with a clock-backed validator.
    pub fn new(store: S) -> Self {
        Self::with_collaborators(store, UserValidator::new(), UserMapper)
    }

    /// Creates a service from explicitly constructed collaborators.
    pub fn with_collaborators(store: S, validator: UserValidator, mapper: UserMapper) -> Self {
        Self {
            store,
            validator,
            mapper,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists a new user.
    pub fn create_user(&self, request: &UserRequest) -> Result<UserView, ServiceError> {
        self.validator.validate(request)?;

        let mut user = self.mapper.to_record(request);
        let id = self.store.create(&mut user)?;
        debug!("event=create_user module=service status=ok id={id}");

        Ok(self.mapper.to_view(&user))
    }

    /// Lists every stored user.
    pub fn read_all_users(&self) -> Result<Vec<UserView>, ServiceError> {
        Ok(self.store.find_all()?)
    }

    pub fn read_user_by_id(&self, id: impl Into<Option<i64>>) -> Result<UserView, ServiceError> {
        let id = self.validator.validate_id(id.into())?;
        let user = self
            .store
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(id))?;
        Ok(self.mapper.to_view(&user))
    }

    /// Replaces all mutable fields of an existing user.
    ///
    /// Both id and request are validated before the store is touched.
    pub fn update_user(
        &self,
        id: impl Into<Option<i64>>,
        request: &UserRequest,
    ) -> Result<UserView, ServiceError> {
        let id = self.validator.validate_id(id.into())?;
        self.validator.validate(request)?;

        let patch = self.mapper.to_record(request);
        let updated = self.store.update(id, &patch)?;
        debug!("event=update_user module=service status=ok id={id}");

        Ok(self.mapper.to_view(&updated))
    }

    /// Deletes an existing user; a missing id is reported as `NotFound`.
    pub fn delete_user(&self, id: impl Into<Option<i64>>) -> Result<(), ServiceError> {
        let id = self.validator.validate_id(id.into())?;
        if self.store.find_by_id(id)?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        self.store.delete(id)?;
        debug!("event=delete_user module=service status=ok id={id}");
        Ok(())
    }
}
