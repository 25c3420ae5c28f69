use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, require_non_blank};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        require_non_blank("password", &self.password)?;
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// `identifier` is matched against both the stored username and email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) identifier: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return Err(DomainError::Validation {
                field: "email",
                message: "email or username is required",
            });
        }
        require_non_blank("password", &self.password)?;
        Ok(Self {
            identifier: identifier.to_string(),
            password: self.password,
        })
    }
}

/// Admin edit of a user record. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdateUserRequest {
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
}

impl UpdateUserRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.username.is_none() && self.email.is_none() && self.password.is_none() {
            return Err(DomainError::Validation {
                field: "body",
                message: "at least one of username, email, password is required",
            });
        }
        let username = self.username.as_deref().map(normalize_username).transpose()?;
        let email = self.email.as_deref().map(normalize_email).transpose()?;
        if let Some(password) = &self.password {
            require_non_blank("password", password)?;
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
            created_at,
        })
    }
}

// Usernames and emails are compared exactly, so only surrounding
// whitespace is stripped; case is preserved.
fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::Validation {
            field: "username",
            message: "must not be empty",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must not be empty",
        });
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        LoginRequest, RegisterRequest, UpdateUserRequest, User, normalize_email,
        normalize_username,
    };
    use crate::domain::error::DomainError;
    use chrono::Utc;

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(0, "alice", "a@x.com", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_but_keeps_case() {
        let value = normalize_email("  A@X.com ").expect("must be valid");
        assert_eq!(value, "A@X.com");
    }

    #[test]
    fn normalize_email_only_requires_a_value() {
        assert_eq!(normalize_email(" bob ").expect("any non-empty value"), "bob");
        assert!(normalize_email("   ").is_err());
    }

    #[test]
    fn username_rules_are_applied() {
        assert!(normalize_username("   ").is_err());
        let long = "x".repeat(200);
        assert_eq!(normalize_username(&long).expect("no length cap"), long);
        assert_eq!(normalize_username(" Alice ").expect("valid"), "Alice");
    }

    #[test]
    fn register_accepts_short_passwords() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "pw123".to_string(),
        };
        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.password, "pw123");
    }

    #[test]
    fn register_rejects_empty_password() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        let err = req.validate().expect_err("password must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "password", .. }));
    }

    #[test]
    fn login_requires_identifier() {
        let req = LoginRequest {
            identifier: "  ".to_string(),
            password: "pw".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_user_requires_some_field() {
        let err = UpdateUserRequest::default()
            .validate()
            .expect_err("empty update must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "body", .. }));
    }

    #[test]
    fn update_user_normalizes_present_fields() {
        let req = UpdateUserRequest {
            username: Some("  bob ".to_string()),
            email: None,
            password: None,
        };
        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.username.as_deref(), Some("bob"));
        assert!(validated.email.is_none());
    }
}
