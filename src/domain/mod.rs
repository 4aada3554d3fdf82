//! Domain layer for the Relay orchestration engine
//!
//! This module contains the core data model and error types. It performs no
//! I/O and knows nothing about how workers are run.

pub mod errors;
pub mod models;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult, HandoffParseError};
