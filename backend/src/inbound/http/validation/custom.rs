//! Asynchronous validators that consult the stores.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::classify::FORBIDDEN_MESSAGE;
use super::rules::coerce;
use super::runner::RequestSnapshot;
use crate::domain::ports::{ListingRepository, UserRepository};
use crate::domain::{Error, Identity, ListingId};
use crate::inbound::http::session::authentication_invalid;

/// Message for a taken email address.
pub const EMAIL_TAKEN: &str = "email already exists";
/// Message for a failed password comparison.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Message for a malformed listing id.
pub const INVALID_ID: &str = "invalid MongoDB id";

/// Result of one custom check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Invalid(String),
    NotFound(String),
    Forbidden(String),
}

/// Field check that may need I/O.
///
/// `Err` aborts the whole request (the store failed or the route is missing
/// the authenticator); a rejected value is an [`Outcome`].
#[async_trait]
pub trait FieldValidator: Send + Sync {
    /// Label used in logs and debug output.
    fn name(&self) -> &'static str;

    /// Validate `value` in the context of `request`.
    async fn validate(
        &self,
        value: Option<&Value>,
        request: &RequestSnapshot,
    ) -> Result<Outcome, Error>;
}

fn caller(request: &RequestSnapshot) -> Result<Identity, Error> {
    request.identity().copied().ok_or_else(authentication_invalid)
}

/// No account may already use the email.
#[derive(Clone)]
pub struct UniqueEmail {
    users: Arc<dyn UserRepository>,
}

impl UniqueEmail {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl FieldValidator for UniqueEmail {
    fn name(&self) -> &'static str {
        "unique-email"
    }

    async fn validate(
        &self,
        value: Option<&Value>,
        _request: &RequestSnapshot,
    ) -> Result<Outcome, Error> {
        let email = coerce(value);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(Outcome::Invalid(EMAIL_TAKEN.to_owned()));
        }
        Ok(Outcome::Ok)
    }
}

/// No account other than the caller's may use the email.
#[derive(Clone)]
pub struct UniqueEmailForCaller {
    users: Arc<dyn UserRepository>,
}

impl UniqueEmailForCaller {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl FieldValidator for UniqueEmailForCaller {
    fn name(&self) -> &'static str {
        "unique-email-for-caller"
    }

    async fn validate(
        &self,
        value: Option<&Value>,
        request: &RequestSnapshot,
    ) -> Result<Outcome, Error> {
        let caller = caller(request)?;
        let email = coerce(value);
        match self.users.find_by_email(&email).await? {
            Some(account) if account.id != *caller.user_id() => {
                Ok(Outcome::Invalid(EMAIL_TAKEN.to_owned()))
            }
            _ => Ok(Outcome::Ok),
        }
    }
}

/// The value is the password of the account named by the body `email`.
#[derive(Clone)]
pub struct Credentials {
    users: Arc<dyn UserRepository>,
}

impl Credentials {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl FieldValidator for Credentials {
    fn name(&self) -> &'static str {
        "credentials"
    }

    async fn validate(
        &self,
        value: Option<&Value>,
        request: &RequestSnapshot,
    ) -> Result<Outcome, Error> {
        let email = request.body_text("email");
        let Some(account) = self.users.find_by_email(&email).await? else {
            debug!("login for unknown email");
            return Ok(Outcome::Invalid(INVALID_CREDENTIALS.to_owned()));
        };
        let password = coerce(value);
        if self.users.verify_password(&account.id, &password).await? {
            Ok(Outcome::Ok)
        } else {
            Ok(Outcome::Invalid(INVALID_CREDENTIALS.to_owned()))
        }
    }
}

/// The body `oldPassword` is the caller's current password.
///
/// Attached to `newPassword`, whose own value is not inspected.
#[derive(Clone)]
pub struct CurrentPassword {
    users: Arc<dyn UserRepository>,
}

impl CurrentPassword {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl FieldValidator for CurrentPassword {
    fn name(&self) -> &'static str {
        "current-password"
    }

    async fn validate(
        &self,
        _value: Option<&Value>,
        request: &RequestSnapshot,
    ) -> Result<Outcome, Error> {
        let caller = caller(request)?;
        let id = caller.user_id();
        if self.users.find_by_id(id).await?.is_none() {
            return Ok(Outcome::Invalid(format!("No user with id: {id}")));
        }
        let old_password = request.body_text("oldPassword");
        if self.users.verify_password(id, &old_password).await? {
            Ok(Outcome::Ok)
        } else {
            Ok(Outcome::Invalid(INVALID_CREDENTIALS.to_owned()))
        }
    }
}

/// The value names an existing listing the caller owns (or the caller is an
/// admin). Format, existence and ownership are checked in that order.
#[derive(Clone)]
pub struct ListingAccess {
    listings: Arc<dyn ListingRepository>,
}

impl ListingAccess {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl FieldValidator for ListingAccess {
    fn name(&self) -> &'static str {
        "listing-access"
    }

    async fn validate(
        &self,
        value: Option<&Value>,
        request: &RequestSnapshot,
    ) -> Result<Outcome, Error> {
        let raw = coerce(value);
        let Ok(id) = ListingId::parse(&raw) else {
            return Ok(Outcome::Invalid(INVALID_ID.to_owned()));
        };
        let Some(listing) = self.listings.find_by_id(&id).await? else {
            return Ok(Outcome::NotFound(format!("no listing with id {id}")));
        };
        if caller(request)?.may_act_for(&listing.created_by) {
            Ok(Outcome::Ok)
        } else {
            Ok(Outcome::Forbidden(FORBIDDEN_MESSAGE.to_owned()))
        }
    }
}

#[cfg(test)]
#[path = "custom_tests.rs"]
mod tests;
