//! Domain model for person records and their transfer objects.
//!
//! # Responsibility
//! - Define the persisted `User` record shape.
//! - Define caller-facing request/view transfer objects.
//!
//! # Invariants
//! - A `User` id is `None` only before its first successful persist.
//! - Front ends hold `UserRequest`/`UserView` copies, never `User` rows.

pub mod user;
