//! User reference model.
//!
//! Core never manages user lifecycle beyond lookup and registration; the
//! returned `UserId` is authoritative for beat ownership.

use serde::{Deserialize, Serialize};

/// Storage-assigned user row id.
pub type UserId = i64;

/// Registered beat owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Registration input for a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}
