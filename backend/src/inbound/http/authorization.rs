//! Authorization gates that run after [`Authenticate`](super::session::Authenticate).

use std::sync::Arc;

use actix_web::HttpMessage;
use actix_web::dev::ServiceRequest;
use actix_web::http::Method;

use super::gate::{Admission, gate_transform};
use super::session::authentication_invalid;
use crate::domain::{Error, Identity, Role};

/// Message returned when the caller's role is not allowed.
pub const ROLE_FORBIDDEN: &str = "Unauthorized to access this route";

/// Message returned when the demo account attempts a mutation.
pub const READ_ONLY: &str = "Test User. Read Only!";

fn attached_identity(req: &ServiceRequest) -> Result<Identity, Error> {
    req.extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(authentication_invalid)
}

/// Admits callers whose role is in the configured set.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use listings_backend::domain::Role;
/// use listings_backend::inbound::http::authorization::RequireRole;
///
/// let _app = App::new().service(web::scope("/admin").wrap(RequireRole::new([Role::Admin])));
/// ```
#[derive(Clone)]
pub struct RequireRole {
    allowed: Arc<[Role]>,
}

impl RequireRole {
    /// Allow exactly the given roles.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: roles.into_iter().collect(),
        }
    }
}

impl Admission for RequireRole {
    const NAME: &'static str = "require-role";

    fn admit(&self, req: &ServiceRequest) -> Result<(), Error> {
        let identity = attached_identity(req)?;
        if self.allowed.contains(&identity.role()) {
            Ok(())
        } else {
            Err(Error::forbidden(ROLE_FORBIDDEN))
        }
    }
}

gate_transform!(RequireRole);

/// Blocks mutating requests from the read-only demo account.
///
/// Safe methods (`GET`, `HEAD`, `OPTIONS`) always pass.
#[derive(Clone, Copy, Default)]
pub struct ReadOnlyGuard;

impl Admission for ReadOnlyGuard {
    const NAME: &'static str = "read-only";

    fn admit(&self, req: &ServiceRequest) -> Result<(), Error> {
        if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
            return Ok(());
        }
        if attached_identity(req)?.is_test_user() {
            return Err(Error::invalid_request(READ_ONLY));
        }
        Ok(())
    }
}

gate_transform!(ReadOnlyGuard);
