//! Shared configuration types for Riskboard services
//!
//! Environment-driven settings that any Riskboard binary needs: the
//! deployment environment, database connection settings and the small
//! helpers used to read typed values out of environment variables.

mod database;
mod error;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigResult};

use std::env;

/// Configuration common to every Riskboard service
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Deployment environment (development, staging, production)
    pub environment: Environment,

    /// Log filter directive (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" | "local" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue(
                "ENVIRONMENT".to_string(),
                format!("unknown environment '{}'", other),
            )),
        }
    }
}

impl Environment {
    /// Whether strict validation (no insecure defaults) applies
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let environment = match env::var("ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            environment,
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Read a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

/// Read an optional environment variable, falling back to `default`
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, using `default` when unset
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("Prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("stage".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("local".parse::<Environment>().unwrap(), Environment::Development);
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("ENVIRONMENT"));
    }

    #[test]
    fn test_environment_display_round_trips() {
        for env in [
            Environment::Development,
            Environment::Staging,
            Environment::Production,
        ] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        temp_env::with_var_unset("RISKBOARD_TEST_UNSET", || {
            assert_eq!(parse_env("RISKBOARD_TEST_UNSET", 7u32).unwrap(), 7);
        });
    }

    #[test]
    fn test_parse_env_reports_bad_values() {
        temp_env::with_var("RISKBOARD_TEST_BAD", Some("seven"), || {
            let err = parse_env::<u32>("RISKBOARD_TEST_BAD", 7).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "RISKBOARD_TEST_BAD"));
        });
    }

    #[test]
    fn test_get_required_env_rejects_blank() {
        temp_env::with_var("RISKBOARD_TEST_BLANK", Some("  "), || {
            assert!(get_required_env("RISKBOARD_TEST_BLANK").is_err());
        });
    }
}
