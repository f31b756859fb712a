//! Error types for Wayfinder Core

use thiserror::Error;

/// Result type alias using Wayfinder's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Wayfinder error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("No path found: {start} -> {goal}")]
    NoPathFound { start: String, goal: String },

    #[error("Data provider error: {0}")]
    DataProvider(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for outcomes a caller should present as "no route" rather than a fault
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::NoPathFound { .. })
    }
}

impl From<crate::limits::ValidationError> for Error {
    fn from(err: crate::limits::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
