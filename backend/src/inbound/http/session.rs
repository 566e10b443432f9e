//! Session authentication.
//!
//! [`Authenticate`] reads the signed token from the `token` cookie, verifies
//! it and attaches the caller's [`Identity`] to the request. Handlers and
//! later gates read it back through the [`Identity`] extractor.

use std::sync::Arc;

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use tracing::debug;

use super::gate::{Admission, gate_transform};
use super::token::TokenCodec;
use crate::domain::{Error, Identity};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Message returned for every authentication failure.
pub const AUTHENTICATION_INVALID: &str = "authentication invalid";

pub(crate) fn authentication_invalid() -> Error {
    Error::unauthorized(AUTHENTICATION_INVALID)
}

/// Middleware verifying the session cookie.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use actix_web::{App, web};
/// use listings_backend::inbound::http::session::Authenticate;
/// use listings_backend::inbound::http::token::TokenCodec;
///
/// let codec = Arc::new(TokenCodec::new(b"secret", Duration::from_secs(60)));
/// let _app = App::new().service(web::scope("/private").wrap(Authenticate::new(codec)));
/// ```
#[derive(Clone)]
pub struct Authenticate {
    codec: Arc<TokenCodec>,
}

impl Authenticate {
    /// Verify tokens with `codec`.
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl Admission for Authenticate {
    const NAME: &'static str = "authenticate";

    fn admit(&self, req: &ServiceRequest) -> Result<(), Error> {
        if req.extensions().contains::<Identity>() {
            return Ok(());
        }
        let cookie = req.cookie(TOKEN_COOKIE).ok_or_else(authentication_invalid)?;
        let identity = self.codec.verify(cookie.value()).map_err(|err| {
            debug!(error = %err, "session token rejected");
            authentication_invalid()
        })?;
        req.extensions_mut().insert(identity);
        Ok(())
    }
}

gate_transform!(Authenticate);

/// The identity attached by [`Authenticate`].
///
/// Extraction fails with `401 authentication invalid` when the route is not
/// behind the authenticator.
impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .copied()
                .ok_or_else(authentication_invalid),
        )
    }
}
