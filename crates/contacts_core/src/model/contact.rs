//! Contact domain model and client input validation.
//!
//! # Responsibility
//! - Define the persisted contact record and the payload used to write it.
//! - Validate payload shape before it reaches persistence.
//!
//! # Invariants
//! - `ContactInput` has no ownership field; `user_id` is always taken from
//!   the resolved caller.
//! - `birthday` year is only meaningful for leap-year arithmetic; birthday
//!   queries compare month and day.

use crate::model::user::UserId;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned numeric contact id.
pub type ContactId = i64;

pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 250;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Persisted contact owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: i64,
    pub birthday: NaiveDate,
    pub description: Option<String>,
    pub user_id: UserId,
}

/// Client payload for create and full update.
///
/// Unknown keys (including any `user_id`) are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: i64,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl ContactInput {
    /// Checks payload shape.
    ///
    /// # Errors
    /// - Blank or over-long name/last name.
    /// - Email over the length limit or not shaped `local@domain.tld`.
    /// - Non-positive phone number.
    /// - Over-long description.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        validate_name("name", &self.name)?;
        validate_name("last_name", &self.last_name)?;

        if self.email.chars().count() > EMAIL_MAX_CHARS {
            return Err(ContactValidationError::TooLong {
                field: "email",
                max: EMAIL_MAX_CHARS,
            });
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ContactValidationError::InvalidEmail(self.email.clone()));
        }

        if self.phone <= 0 {
            return Err(ContactValidationError::InvalidPhone(self.phone));
        }

        if let Some(description) = self.description.as_deref() {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(ContactValidationError::TooLong {
                    field: "description",
                    max: DESCRIPTION_MAX_CHARS,
                });
            }
        }

        Ok(())
    }
}

/// Validates one name-like field (also used by the rename path).
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ContactValidationError> {
    if value.trim().is_empty() {
        return Err(ContactValidationError::Blank(field));
    }
    if value.chars().count() > NAME_MAX_CHARS {
        return Err(ContactValidationError::TooLong {
            field,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}

/// Payload shape violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    Blank(&'static str),
    TooLong { field: &'static str, max: usize },
    InvalidEmail(String),
    InvalidPhone(i64),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "`{field}` must not be blank"),
            Self::TooLong { field, max } => {
                write!(f, "`{field}` must be at most {max} characters")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number `{value}`"),
        }
    }
}

impl Error for ContactValidationError {}

#[cfg(test)]
mod tests {
    use super::{ContactInput, ContactValidationError};
    use chrono::NaiveDate;

    fn input() -> ContactInput {
        ContactInput {
            name: "Olena".to_string(),
            last_name: "Kovalenko".to_string(),
            email: "olena@example.com".to_string(),
            phone: 380_501_234_567,
            birthday: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            description: Some("college friend".to_string()),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert_eq!(input().validate(), Ok(()));
    }

    #[test]
    fn blank_last_name_is_rejected() {
        let mut value = input();
        value.last_name = "   ".to_string();
        assert_eq!(
            value.validate(),
            Err(ContactValidationError::Blank("last_name"))
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut value = input();
        value.email = "olena.example.com".to_string();
        assert!(matches!(
            value.validate(),
            Err(ContactValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn non_positive_phone_is_rejected() {
        let mut value = input();
        value.phone = 0;
        assert_eq!(value.validate(), Err(ContactValidationError::InvalidPhone(0)));
    }

    #[test]
    fn long_description_is_rejected() {
        let mut value = input();
        value.description = Some("x".repeat(251));
        assert!(matches!(
            value.validate(),
            Err(ContactValidationError::TooLong {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn name_limit_counts_chars_not_bytes() {
        let mut value = input();
        value.name = "Ї".repeat(50);
        assert_eq!(value.validate(), Ok(()));
    }
}
