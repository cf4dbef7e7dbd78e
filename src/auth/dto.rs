use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::User;
use crate::error::FieldError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for signup. No Debug derive: the plaintext password must
/// never reach a log line.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    // Defaulted so an absent field reaches validate() as empty and comes
    // back as a 400 field error rather than a deserialization rejection.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Request body for signin.
#[derive(Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after signin.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub email: String,
    pub access_token: String,
}

/// Public part of the user returned to clients. The password hash never
/// crosses this boundary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

fn check_credentials(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
    // Presence only; no complexity rule.
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }
    errors
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = check_credentials(&self.email, &self.password);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl SigninRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = check_credentials(&self.email, &self.password);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_credentials() {
        let req = SigninRequest {
            email: "a@x.com".into(),
            password: "123".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_password_is_a_field_error() {
        let req = SignupRequest {
            email: "a@x.com".into(),
            password: "".into(),
            first_name: "A".into(),
            last_name: "B".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn missing_email_is_a_field_error() {
        let req = SigninRequest {
            email: "".into(),
            password: "123".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn rejects_malformed_email() {
        let req = SigninRequest {
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn public_user_serializes_without_hash() {
        let user = User {
            id: 7,
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(json.contains("firstName"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
