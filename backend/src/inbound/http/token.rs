//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the caller's `userId`, `role` and the
//! optional `testUser` flag. Expiry is enforced without leeway.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Identity, ObjectIdError, Role, UserId};

/// Failures while issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign session token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    /// Signature, expiry or structure check failed.
    #[error("session token rejected: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),
    /// The token verified but names a malformed user id.
    #[error("session token carries an invalid user id: {0}")]
    Subject(#[source] ObjectIdError),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: String,
    role: Role,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    test_user: bool,
    iat: u64,
    exp: u64,
}

/// Issues and verifies session tokens with a shared secret.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use listings_backend::domain::{Identity, Role, UserId};
/// use listings_backend::inbound::http::token::TokenCodec;
///
/// let codec = TokenCodec::new(b"secret", Duration::from_secs(60));
/// let caller = Identity::new(UserId::generate(), Role::Admin);
/// let token = codec.issue(&caller).expect("sign");
/// assert_eq!(codec.verify(&token).expect("verify"), caller);
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    /// Build a codec for `secret`; issued tokens expire after `lifetime`.
    #[must_use]
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Token lifetime, also used as the cookie max-age.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a token for `identity`.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, jsonwebtoken::get_current_timestamp())
    }

    fn issue_at(&self, identity: &Identity, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: identity.user_id().to_string(),
            role: identity.role(),
            test_user: identity.is_test_user(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.lifetime.as_secs()),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify `token` and recover the identity it was issued for.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Decode)?;
        let Claims {
            user_id,
            role,
            test_user,
            ..
        } = data.claims;
        let user_id = UserId::parse(&user_id).map_err(TokenError::Subject)?;
        Ok(Identity::new(user_id, role).as_test_user(test_user))
    }
}
