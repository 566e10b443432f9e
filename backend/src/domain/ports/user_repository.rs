//! Port for the user account store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewUser, ProfileUpdate, UserAccount, UserId};

/// Failures raised by user store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("user store unavailable: {message}")]
    Unavailable { message: String },
    /// Another account already uses the email address.
    #[error("email already registered: {email}")]
    DuplicateEmail { email: String },
    /// The account targeted by a mutation does not exist.
    #[error("no user with id {id}")]
    Missing { id: UserId },
}

impl UserStoreError {
    /// Convenience constructor for [`UserStoreError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// User account persistence, including credential checks.
///
/// Adapters own password hashing; callers only ever pass plain candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserStoreError>;

    /// Fetch an account by email address (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserStoreError>;

    /// Compare `candidate` with the stored password of `id`.
    ///
    /// Unknown accounts yield `Ok(false)`.
    async fn verify_password(&self, id: &UserId, candidate: &str)
    -> Result<bool, UserStoreError>;

    /// Number of stored accounts.
    async fn count(&self) -> Result<usize, UserStoreError>;

    /// Store a new account with the role it carries.
    async fn create(&self, user: NewUser) -> Result<UserAccount, UserStoreError>;

    /// Store a self-registered account.
    ///
    /// The account becomes [`Role::Admin`] when no other non-demo account
    /// exists and [`Role::User`] otherwise. Adapters make the check and the
    /// insert one atomic step.
    ///
    /// [`Role::Admin`]: crate::domain::Role::Admin
    /// [`Role::User`]: crate::domain::Role::User
    async fn register(&self, user: NewUser) -> Result<UserAccount, UserStoreError>;

    /// Replace the editable profile fields of an account.
    async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserAccount, UserStoreError>;

    /// Replace the password of an account.
    async fn set_password(&self, id: &UserId, password: &str) -> Result<(), UserStoreError>;

    /// Replace the avatar (a `data:` URI) of an account.
    async fn set_avatar(&self, id: &UserId, avatar: String)
    -> Result<UserAccount, UserStoreError>;
}
