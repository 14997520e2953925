//! Error types for the household ecosystem.

use thiserror::Error;

/// Errors that can occur in household operations.
#[derive(Error, Debug)]
pub enum HouseholdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid transition for '{id}': {reason}")]
    InvalidTransition { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for household operations.
pub type HouseholdResult<T> = Result<T, HouseholdError>;
