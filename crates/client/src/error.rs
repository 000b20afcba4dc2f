use storage::error::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Storage error: {0}")]
    StorageError(#[source] StorageError),

    #[error("Score edit session is closed")]
    SessionClosed,
}

impl From<StorageError> for ClientError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Validation(errors) => ClientError::ValidationError(errors.to_string()),
            StorageError::NotFound(msg) => ClientError::NotFoundError(msg),
            StorageError::Conflict(msg) => ClientError::ConflictError(msg),
            other => ClientError::StorageError(other),
        }
    }
}
