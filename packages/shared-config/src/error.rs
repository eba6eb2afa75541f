//! Configuration error types

use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Variable is set but does not parse
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Settings are individually valid but inconsistent together
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
