//! Configuration
//!
//! Layered configuration: built-in defaults, a TOML file, then environment
//! variables.

pub mod config;
pub mod loader;

pub use config::AppConfig;
pub use loader::{ConfigLoader, ConfigValidationError};
