//! Caller identity derived from a verified session token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Role recorded on a user account and carried in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account.
    User,
    /// Administrator; passes ownership checks on any listing.
    Admin,
}

impl Role {
    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// The authenticated caller of a single request.
///
/// Only the session authenticator constructs identities for live requests;
/// they live in request extensions and are never persisted.
///
/// # Examples
/// ```
/// use listings_backend::domain::{Identity, Role, UserId};
///
/// let id = UserId::generate();
/// let caller = Identity::new(id, Role::User);
/// assert!(caller.may_act_for(&id));
/// assert!(!caller.may_act_for(&UserId::generate()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    role: Role,
    test_user: bool,
}

impl Identity {
    /// Identity for a regular (writable) account.
    #[must_use]
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            test_user: false,
        }
    }

    /// Flag the identity as a read-only demo account.
    #[must_use]
    pub fn as_test_user(mut self, test_user: bool) -> Self {
        self.test_user = test_user;
        self
    }

    /// Authenticated account id.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role granted by the token.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller is the read-only demo account.
    #[must_use]
    pub fn is_test_user(&self) -> bool {
        self.test_user
    }

    /// Admins act for anyone; other callers only for themselves.
    #[must_use]
    pub fn may_act_for(&self, owner: &UserId) -> bool {
        self.role == Role::Admin || &self.user_id == owner
    }
}
