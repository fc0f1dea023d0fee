//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, mapping and store calls per use-case.
//! - Keep front ends decoupled from storage details.

pub mod user_service;
