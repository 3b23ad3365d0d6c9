//! User identity record as seen by the contacts core.
//!
//! The core reads users only to scope contact queries. Registration,
//! password hashing and token issuance live outside this crate.

use serde::Serialize;

/// Store-assigned numeric user id.
pub type UserId = i64;

/// Resolved identity of the calling user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Insert model for a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: None,
            email: email.into(),
            password_hash: password_hash.into(),
            avatar: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
