use thiserror::Error;

/// API-specific errors for gpubot-api
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network or serialization failure talking to the service.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status code and a message.
    #[error("Service rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// A required argument was missing; no request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Build a rejection from a response's code and message fields.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
