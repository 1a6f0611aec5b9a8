//! Error type for configuration loading

use thiserror::Error;

/// Errors from loading and validating application configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the configuration Error.
pub type Result<T> = std::result::Result<T, Error>;
