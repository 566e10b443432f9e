//! In-memory [`UserRepository`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{NewUser, ProfileUpdate, Role, UserAccount, UserId};

/// Cheapest bcrypt cost; meant for tests.
pub const MIN_HASH_COST: u32 = 4;

struct StoredUser {
    account: UserAccount,
    hash: String,
}

async fn hash_password(password: Zeroizing<String>, cost: u32) -> Result<String, UserStoreError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost))
        .await
        .map_err(|err| UserStoreError::unavailable(format!("password hashing aborted: {err}")))?
        .map_err(|err| UserStoreError::unavailable(format!("password hashing failed: {err}")))
}

async fn password_matches(candidate: Zeroizing<String>, hash: String) -> Result<bool, UserStoreError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(candidate.as_bytes(), &hash))
        .await
        .map_err(|err| UserStoreError::unavailable(format!("password check aborted: {err}")))?
        .map_err(|err| UserStoreError::unavailable(format!("password check failed: {err}")))
}

/// Process-local user store keeping bcrypt password hashes.
///
/// Hashing runs on the blocking pool before the map lock is taken.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, StoredUser>>,
    cost: u32,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::with_hash_cost(bcrypt::DEFAULT_COST)
    }
}

impl InMemoryUserRepository {
    /// An empty store hashing with bcrypt's default cost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store hashing with the given bcrypt cost.
    #[must_use]
    pub fn with_hash_cost(cost: u32) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            cost,
        }
    }

    /// Hash the password, then insert under one write lock. `decide_role`
    /// sees the map as it is at insertion time.
    async fn insert(
        &self,
        user: NewUser,
        decide_role: impl FnOnce(&HashMap<UserId, StoredUser>, &NewUser) -> Role + Send,
    ) -> Result<UserAccount, UserStoreError> {
        let hash = hash_password(user.password.clone(), self.cost).await?;
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(UserStoreError::DuplicateEmail { email: user.email });
        }
        let role = decide_role(&users, &user);
        let NewUser {
            name,
            last_name,
            email,
            location,
            test_user,
            ..
        } = user;
        let account = UserAccount {
            id: UserId::generate(),
            name,
            last_name,
            email,
            location,
            role,
            test_user,
            avatar: None,
        };
        debug!(user_id = %account.id, role = %account.role, "user account created");
        users.insert(
            account.id,
            StoredUser {
                account: account.clone(),
                hash,
            },
        );
        Ok(account)
    }
}

fn email_taken(users: &HashMap<UserId, StoredUser>, email: &str, except: Option<&UserId>) -> bool {
    users
        .values()
        .any(|stored| stored.account.email == email && Some(&stored.account.id) != except)
}

fn has_registered_account(users: &HashMap<UserId, StoredUser>) -> bool {
    users.values().any(|stored| !stored.account.test_user)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users.get(id).map(|stored| stored.account.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|stored| stored.account.email == email)
            .map(|stored| stored.account.clone()))
    }

    async fn verify_password(
        &self,
        id: &UserId,
        candidate: &str,
    ) -> Result<bool, UserStoreError> {
        let hash = {
            let users = self.users.read().await;
            match users.get(id) {
                Some(stored) => stored.hash.clone(),
                None => return Ok(false),
            }
        };
        password_matches(Zeroizing::new(candidate.to_owned()), hash).await
    }

    async fn count(&self) -> Result<usize, UserStoreError> {
        Ok(self.users.read().await.len())
    }

    async fn create(&self, user: NewUser) -> Result<UserAccount, UserStoreError> {
        self.insert(user, |_, user| user.role).await
    }

    async fn register(&self, user: NewUser) -> Result<UserAccount, UserStoreError> {
        self.insert(user, |users, user| {
            if user.test_user || has_registered_account(users) {
                Role::User
            } else {
                Role::Admin
            }
        })
        .await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserAccount, UserStoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &update.email, Some(id)) {
            return Err(UserStoreError::DuplicateEmail {
                email: update.email,
            });
        }
        let stored = users
            .get_mut(id)
            .ok_or(UserStoreError::Missing { id: *id })?;
        stored.account.apply(update);
        Ok(stored.account.clone())
    }

    async fn set_password(&self, id: &UserId, password: &str) -> Result<(), UserStoreError> {
        if !self.users.read().await.contains_key(id) {
            return Err(UserStoreError::Missing { id: *id });
        }
        let hash = hash_password(Zeroizing::new(password.to_owned()), self.cost).await?;
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or(UserStoreError::Missing { id: *id })?;
        stored.hash = hash;
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: String,
    ) -> Result<UserAccount, UserStoreError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or(UserStoreError::Missing { id: *id })?;
        stored.account.avatar = Some(avatar);
        Ok(stored.account.clone())
    }
}
