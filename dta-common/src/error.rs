//! Common error types for the DTA tools

use thiserror::Error;

/// Common result type for DTA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the DTA tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML in a configuration file
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Requested file or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External packaging tool failed
    #[error("Packaging failed: {0}")]
    Packaging(String),

    /// Other external collaborator (e.g. timed-track editor) failed
    #[error("External tool failed: {0}")]
    ExternalTool(String),
}
