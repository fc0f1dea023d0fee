//! Field and identifier validation for user requests.
//!
//! # Responsibility
//! - Reject malformed requests before any mapping or storage access.
//! - Report the first violated constraint only.
//!
//! # Invariants
//! - Check order is fixed: name, email, age, created_at.
//! - Validation is a pure function of the request and the validator's clock.

use crate::model::user::{UserId, UserRequest, MAX_AGE, MIN_AGE};
use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is absent or whitespace only.
    BlankName,
    /// Email is absent or has no `@` separator.
    InvalidEmail,
    MissingAge,
    AgeOutOfRange(i32),
    MissingCreatedAt,
    /// Creation date is after the validator's current date.
    CreatedAtInFuture { created_at: NaiveDate, today: NaiveDate },
    /// Identifier is absent or not positive.
    InvalidId(Option<i64>),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidEmail => write!(f, "email must contain @"),
            Self::MissingAge => write!(f, "age is required"),
            Self::AgeOutOfRange(age) if *age < MIN_AGE => {
                write!(f, "age must be at least {MIN_AGE}, got {age}")
            }
            Self::AgeOutOfRange(age) => write!(f, "age must be at most {MAX_AGE}, got {age}"),
            Self::MissingCreatedAt => write!(f, "created_at is required"),
            Self::CreatedAtInFuture { created_at, today } => write!(
                f,
                "created_at must not be in the future ({created_at} is after {today})"
            ),
            Self::InvalidId(Some(id)) => write!(f, "id must be a positive number, got {id}"),
            Self::InvalidId(None) => write!(f, "id must be a positive number"),
        }
    }
}

impl Error for ValidationError {}

/// Validates user requests and identifiers.
///
/// "Today" is resolved per call from the local clock unless pinned with
/// [`UserValidator::with_today`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UserValidator {
    fixed_today: Option<NaiveDate>,
}

impl UserValidator {
    /// Creates a validator bound to the local calendar date.
    pub fn new() -> Self {
        Self { fixed_today: None }
    }

    /// Creates a validator that treats `today` as the current date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            fixed_today: Some(today),
        }
    }

    /// Returns the date used for the "not in the future" check.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Checks all request constraints; the first failure is returned.
    pub fn validate(&self, request: &UserRequest) -> Result<(), ValidationError> {
        let name_ok = request
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !name_ok {
            return Err(ValidationError::BlankName);
        }

        let email_ok = request
            .email
            .as_deref()
            .is_some_and(|email| email.contains('@'));
        if !email_ok {
            return Err(ValidationError::InvalidEmail);
        }

        match request.age {
            None => return Err(ValidationError::MissingAge),
            Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
                return Err(ValidationError::AgeOutOfRange(age));
            }
            Some(_) => {}
        }

        let Some(created_at) = request.created_at else {
            return Err(ValidationError::MissingCreatedAt);
        };
        let today = self.today();
        if created_at > today {
            return Err(ValidationError::CreatedAtInFuture { created_at, today });
        }

        Ok(())
    }

    /// Checks that `id` is present and positive, returning it unwrapped.
    pub fn validate_id(&self, id: Option<i64>) -> Result<UserId, ValidationError> {
        match id {
            Some(value) if value > 0 => Ok(value),
            other => Err(ValidationError::InvalidId(other)),
        }
    }
}
