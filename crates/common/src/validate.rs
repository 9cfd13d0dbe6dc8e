//! Client-side input validation. Failures here are surfaced synchronously
//! and never reach the network.

use serde::Serialize;
use thiserror::Error;

use crate::role::Role;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A rejected input with a user-displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Loose email plausibility check: something before an `@`, and a dot in
/// the domain part. Real validation is the server's job.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Registration form, validated before dispatch. The confirmation field is
/// client-only and never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("Name is required"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::new("Please enter a valid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::new("Passwords do not match"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
            role: Role::Master,
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let mut f = form();
        f.password = "short".into();
        f.confirm_password = "short".into();
        let err = f.validate().unwrap_err();
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // 8 characters, 14 bytes.
        let mut f = form();
        f.password = "пароль99".into();
        f.confirm_password = "пароль99".into();
        assert!(f.validate().is_ok());

        // 7 characters is still too short even when the byte count clears 8.
        f.password = "пароль9".into();
        f.confirm_password = "пароль9".into();
        assert!(f.validate().is_err());
    }

    #[test]
    fn rejects_confirmation_mismatch() {
        let mut f = form();
        f.confirm_password = "different99".into();
        assert_eq!(f.validate().unwrap_err().message, "Passwords do not match");
    }

    #[test]
    fn rejects_implausible_emails() {
        for bad in ["", "jane", "jane@", "@example.com", "jane@example", "a b@c.d"] {
            assert!(!is_valid_email(bad), "{bad:?} should be rejected");
        }
        assert!(is_valid_email("jane@example.com"));
    }

    #[test]
    fn confirmation_is_not_serialized() {
        let v = serde_json::to_value(form()).unwrap();
        assert!(v.get("confirm_password").is_none());
        assert_eq!(v["role"], "MASTER");
    }
}
