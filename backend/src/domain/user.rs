//! User accounts.
//!
//! Password hashes never leave the user store; the domain only sees the
//! account projection below and hands plain passwords to the store for
//! hashing or comparison.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Role, UserId};

/// Account data exposed to handlers and serialised to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub role: Role,
    #[serde(default)]
    pub test_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Registration data handed to the user store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub password: Zeroizing<String>,
    pub role: Role,
    pub test_user: bool,
}

impl NewUser {
    /// A writable account with the given role.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            last_name: String::new(),
            email: email.into(),
            location: String::new(),
            password: Zeroizing::new(password.into()),
            role,
            test_user: false,
        }
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the last name.
    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    /// Mark the account as the read-only demo user.
    #[must_use]
    pub fn as_test_user(mut self) -> Self {
        self.test_user = true;
        self
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub location: String,
}

impl UserAccount {
    /// Apply a profile update in place.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            last_name,
            email,
            location,
        } = update;
        self.name = name;
        self.last_name = last_name;
        self.email = email;
        self.location = location;
    }
}
