//! Store layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the user store contract consumed by the service layer.
//! - Isolate SQLite query and transaction details from orchestration.
//!
//! # Invariants
//! - Every mutating store call runs in exactly one transaction.
//! - No transaction outlives the store call that opened it.

mod unit_of_work;
pub mod user_repo;
