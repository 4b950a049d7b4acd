//! Core error types for serene-core.
//!
//! Every fallible operation in the library returns one of these. None of
//! them is fatal: the host turns them into a message and carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for serene-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Chat stream errors
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Sign-in flow errors
    #[error("Sign-in error: {0}")]
    SignIn(#[from] SignInError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// A session needs at least one second to count down
    #[error("Session duration must be greater than zero")]
    ZeroDuration,

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Journey day not yet unlocked
    #[error("Day {day} is locked until day {current} is complete")]
    DayLocked { day: u32, current: u32 },
}

/// Chat stream errors.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Nothing to send
    #[error("Message is empty")]
    EmptyMessage,

    /// A reply is still streaming
    #[error("A reply is already in progress")]
    Busy,

    /// Non-success response from the chat endpoint
    #[error("{0}")]
    Rejected(String),

    /// Response had no body to stream
    #[error("No response body")]
    NoBody,

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint is not a valid URL
    #[error("Invalid chat endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Email-code sign-in errors.
#[derive(Error, Debug)]
pub enum SignInError {
    /// Address is blank or lacks '@'
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// Entered code differs from the one sent
    #[error("The code you entered doesn't match")]
    CodeMismatch,

    /// Operation not valid in the current step
    #[error("No code has been requested yet")]
    NoPendingCode,

    /// Email dispatch failed
    #[error("Failed to send code: {0}")]
    SendFailed(String),
}

/// Audio or speech backend failures.
///
/// The session engine logs and drops these; they never stop the clock.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Backend not present in this environment
    #[error("{0} is not supported in this environment")]
    Unsupported(&'static str),

    /// Backend reported a failure
    #[error("Playback failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for SignInError {
    fn from(err: reqwest::Error) -> Self {
        SignInError::SendFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
