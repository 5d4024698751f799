//! Error types for pb-core

use thiserror::Error;

/// Main error type for pb-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pb-core
pub type Result<T> = std::result::Result<T, Error>;
