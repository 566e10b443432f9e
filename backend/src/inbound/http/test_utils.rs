//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::test;

use super::session::TOKEN_COOKIE;
use super::state::HttpState;
use super::token::TokenCodec;
use crate::domain::{Error, Identity};
use crate::outbound::memory::{InMemoryListingRepository, InMemoryUserRepository, MIN_HASH_COST};

/// Codec with a fixed secret and a one hour lifetime.
pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(
        b"test-secret-for-handlers",
        Duration::from_secs(3600),
    ))
}

/// Session cookie for `identity`, signed with `codec`.
pub fn token_cookie(codec: &TokenCodec, identity: &Identity) -> Cookie<'static> {
    let token = codec.issue(identity).expect("sign test token");
    Cookie::new(TOKEN_COOKIE, token)
}

/// Decode a JSON error response.
pub async fn error_body<B: MessageBody>(res: ServiceResponse<B>) -> Error {
    test::read_body_json(res).await
}

/// State over fresh in-memory stores plus the stores themselves.
pub fn memory_state() -> (
    HttpState,
    Arc<InMemoryUserRepository>,
    Arc<InMemoryListingRepository>,
) {
    let users = Arc::new(InMemoryUserRepository::with_hash_cost(MIN_HASH_COST));
    let listings = Arc::new(InMemoryListingRepository::new());
    let state = HttpState::new(users.clone(), listings.clone(), test_codec());
    (state, users, listings)
}

const BOUNDARY: &str = "----listings-test-boundary";

/// Build a `multipart/form-data` body with one file field.
///
/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart_body(field: &str, filename: &str, mime: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
