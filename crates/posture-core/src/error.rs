//! Service errors
//!
//! Every failure of a backend call ends up here; callers decide how to surface it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Short text for the failed-to-load panel.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport(_) | ServiceError::Timeout => {
                "Could not reach the posture service".to_string()
            }
            ServiceError::Unauthorized => "Session expired, sign in again".to_string(),
            ServiceError::Status { status, .. } => format!("Failed to load (HTTP {})", status),
            ServiceError::Decode(_) | ServiceError::InvalidPayload(_) => {
                "The service returned unexpected data".to_string()
            }
            ServiceError::Validation(e) => format!("Invalid input: {}", e),
            ServiceError::InvalidUrl(_) => "Invalid service address".to_string(),
        }
    }
}
