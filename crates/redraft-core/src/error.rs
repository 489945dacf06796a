//! Error types for redraft.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input too large: {actual} characters exceeds limit of {limit}")]
    InputTooLarge { actual: usize, limit: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Content rejected by provider: {0}")]
    ContentRejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable classification string recorded as `errorType` on failed jobs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::InputTooLarge { .. } => "size_limit",
            Error::Storage(_) => "storage",
            Error::NotFound(_) => "not_found",
            Error::Inference(_) => "inference",
            Error::ContentRejected(_) => "content_rejected",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_classification() {
        assert_eq!(
            Error::InputTooLarge { actual: 10, limit: 5 }.error_type(),
            "size_limit"
        );
        assert_eq!(Error::Inference("down".into()).error_type(), "inference");
        assert_eq!(Error::NotFound("jobs/x".into()).error_type(), "not_found");
    }
}
