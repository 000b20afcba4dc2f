use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for registering a participant
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Email is required"))]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

impl CreateParticipantRequest {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Copy with surrounding whitespace removed, so blank input fails validation.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_fails_after_trim() {
        let req = CreateParticipantRequest::new("   ", "ann@example.com").trimmed();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_empty_email_fails() {
        let req = CreateParticipantRequest::new("Ann", "");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_valid_request() {
        let req = CreateParticipantRequest::new(" Ann ", " ann@example.com ").trimmed();
        assert!(req.validate().is_ok());
        assert_eq!(req.name, "Ann");
        assert_eq!(req.email, "ann@example.com");
    }
}
