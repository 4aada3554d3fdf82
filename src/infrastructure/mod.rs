//! Infrastructure layer module
//!
//! Everything that touches the process environment:
//! - Configuration loading (figment, YAML files and `RELAY_*` variables)
//! - Logging setup (tracing-subscriber with optional rolling files)

pub mod config;
pub mod logging;
