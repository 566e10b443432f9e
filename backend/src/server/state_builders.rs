//! Builders for HTTP state backed by the in-memory stores.

use std::sync::Arc;

use tracing::info;

use super::ServerConfig;
use crate::config::DemoAccount;
use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{NewUser, Role};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::TokenCodec;
use crate::outbound::memory::{InMemoryListingRepository, InMemoryUserRepository};

/// Build handler state from validated configuration.
pub fn build_http_state(config: &ServerConfig) -> HttpState {
    let tokens = Arc::new(TokenCodec::new(&config.jwt_secret, config.token_lifetime));
    HttpState::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryListingRepository::new()),
        tokens,
    )
    .with_secure_cookies(config.cookie_secure)
}

/// Create the read-only demo account unless its email is already taken.
pub async fn seed_demo_account(
    users: &dyn UserRepository,
    demo: &DemoAccount,
) -> Result<(), UserStoreError> {
    if users.find_by_email(&demo.email).await?.is_some() {
        return Ok(());
    }
    let account = users
        .create(
            NewUser::new("Demo", demo.email.as_str(), demo.password.as_str(), Role::User)
                .with_location("Demo City")
                .as_test_user(),
        )
        .await?;
    info!(user_id = %account.id, "demo account seeded");
    Ok(())
}
