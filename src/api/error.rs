use thiserror::Error;

/// Failure talking to the account backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with an error body (`{"error": "..."}`)
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from server (status {status})")]
    UnexpectedStatus { status: u16 },

    #[error("Server did not provide a CSRF token for {path}")]
    MissingCsrfToken { path: String },

    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } | ApiError::UnexpectedStatus { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
