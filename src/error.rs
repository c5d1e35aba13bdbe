//! Error types for dictag.

use thiserror::Error;

/// Result type for dictag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dictag operations.
///
/// Only truly malformed configuration surfaces as an error; a document with
/// no matches is an empty annotation set, not a failure.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Dictionary compilation failed (empty surface form, bad automaton).
    #[error("Invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// Tagger configuration rejected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error (dictionary/negative-list loading).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid dictionary error.
    pub fn invalid_dictionary(msg: impl Into<String>) -> Self {
        Error::InvalidDictionary(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
