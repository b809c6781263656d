use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but not readable (e.g. not unicode)
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    /// A variable, or its default, could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Values parsed individually but do not make sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
