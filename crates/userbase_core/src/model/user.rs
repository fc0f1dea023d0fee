//! User record and transfer objects.
//!
//! # Responsibility
//! - Define the canonical person record owned by the store.
//! - Define request and view shapes exchanged with front ends.
//!
//! # Invariants
//! - `id` is server-assigned, positive, and never changes once set.
//! - `name`, `email`, `age` and `created_at` are always present on a
//!   persisted record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-generated identifier of a persisted user.
pub type UserId = i64;

/// Inclusive lower bound for `age`.
pub const MIN_AGE: i32 = 1;
/// Inclusive upper bound for `age`.
pub const MAX_AGE: i32 = 99;

/// Persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on first persist.
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Calendar date the record was created on. Never in the future.
    pub created_at: NaiveDate,
}

impl User {
    /// Builds an unpersisted record (`id = None`).
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
        created_at: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            age,
            created_at,
        }
    }

    /// Returns whether the store has assigned an identifier yet.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Overwrites every mutable field from `patch`; `id` is kept.
    pub fn merge_from(&mut self, patch: &User) {
        self.name.clone_from(&patch.name);
        self.email.clone_from(&patch.email);
        self.age = patch.age;
        self.created_at = patch.created_at;
    }
}

/// Caller-supplied payload for create and update use-cases.
///
/// Every field is optional so a missing value can be reported as a
/// validation error instead of failing at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub created_at: Option<NaiveDate>,
}

/// Request used by `create_user`.
pub type CreateUserRequest = UserRequest;
/// Request used by `update_user`; identity travels as a separate argument.
pub type UpdateUserRequest = UserRequest;

impl UserRequest {
    /// Builds a request with every field present.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
        created_at: NaiveDate,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            age: Some(age),
            created_at: Some(created_at),
        }
    }
}

/// Read projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: NaiveDate,
}
