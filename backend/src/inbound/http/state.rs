//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use super::token::TokenCodec;
use super::upload::UploadPolicy;
use super::validation::RuleBook;
use crate::domain::ports::{ListingRepository, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub tokens: Arc<TokenCodec>,
    pub rules: Arc<RuleBook>,
    pub uploads: UploadPolicy,
    pub cookie_secure: bool,
}

impl HttpState {
    /// Construct state from the store ports and the token codec.
    ///
    /// The rule book is built here so its validators share the same stores.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use listings_backend::inbound::http::state::HttpState;
    /// use listings_backend::inbound::http::token::TokenCodec;
    /// use listings_backend::outbound::memory::{
    ///     InMemoryListingRepository, InMemoryUserRepository,
    /// };
    ///
    /// let state = HttpState::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(InMemoryListingRepository::new()),
    ///     Arc::new(TokenCodec::new(b"secret", Duration::from_secs(60))),
    /// )
    /// .with_secure_cookies(true);
    /// assert!(state.cookie_secure);
    /// ```
    pub fn new(
        users: Arc<dyn UserRepository>,
        listings: Arc<dyn ListingRepository>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        let rules = Arc::new(RuleBook::new(users.clone(), listings.clone()));
        Self {
            users,
            listings,
            tokens,
            rules,
            uploads: UploadPolicy::default(),
            cookie_secure: false,
        }
    }

    /// Mark session cookies `Secure`.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}
