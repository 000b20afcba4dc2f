use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Build a validation error for a single field.
    pub fn invalid_field(field: &'static str, code: &'static str, message: String) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());

        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        StorageError::Validation(errors)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_carries_message() {
        let err = StorageError::invalid_field("score", "negative_score", "Score must be >= 0".into());

        let StorageError::Validation(errors) = &err else {
            panic!("expected a validation error, got {err:?}");
        };
        let field_errors = errors.field_errors();
        let score_errors = field_errors.get("score").expect("score field error");
        assert_eq!(score_errors[0].code, "negative_score");
        assert_eq!(score_errors[0].message.as_deref(), Some("Score must be >= 0"));
    }

    #[test]
    fn test_plain_errors_are_not_constraint_violations() {
        let err = StorageError::NotFound("participant 4".into());
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }
}
