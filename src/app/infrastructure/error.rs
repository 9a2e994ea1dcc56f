use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Already editing polygons of '{0}'")]
    EditInProgress(String),

    #[error("No polygon edit in progress")]
    NoActiveEdit,
}

impl AppError {
    /// Validation failures leave the caller's input in place for correction.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
