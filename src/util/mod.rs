//! Shared helpers (configuration loading, crate-level errors).

pub mod config;
pub mod error;

pub use config::{load_recovery_config, resolve_relative, ConfigError, RecoveryConfig};
pub use error::DatanodeError;
