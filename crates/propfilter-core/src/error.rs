//! Error types for property filtering.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while building name sets or writing filtered output.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A name set could not be built from the given input.
    #[error("invalid property name: {0}")]
    InvalidName(String),

    /// A sink received tokens in an order that does not form valid JSON.
    #[error("invalid token sequence: {0}")]
    InvalidState(String),

    /// A token was written after the sink was closed.
    #[error("sink is closed")]
    Closed,

    /// The underlying writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be mapped onto the token stream.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl serde::ser::Error for FilterError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }
}

/// Convenience alias for filter results.
pub type FilterResult<T> = Result<T, FilterError>;
