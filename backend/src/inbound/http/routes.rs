//! Route table.
//!
//! ```text
//! /api/v1/auth        register, login, logout         (public)
//! /api/v1/users       profile, password, avatar       (authenticated, read-only guard)
//! /api/v1/users/admin app-stats                       (admin)
//! /api/v1/listings    CRUD                            (authenticated, read-only guard)
//! ```

use std::sync::Arc;

use actix_web::web;

use super::auth::{login, logout, register};
use super::authorization::{ReadOnlyGuard, RequireRole};
use super::listings::{create_listing, delete_listing, get_listing, list_listings, update_listing};
use super::session::Authenticate;
use super::token::TokenCodec;
use super::users::{app_stats, change_password, current_user, update_user, upload_avatar};
use crate::domain::{ApiResult, Error, Role};

/// Message for requests that match no route.
pub const ROUTE_NOT_FOUND: &str = "route does not exist";

/// Fallback for unmatched requests.
pub async fn route_not_found() -> ApiResult<web::Json<()>> {
    Err(Error::not_found(ROUTE_NOT_FOUND))
}

/// Register the `/api/v1` tree.
///
/// Gates are innermost-first: the authenticator wraps the read-only guard,
/// which wraps the role check.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use actix_web::App;
/// use listings_backend::inbound::http::routes::configure;
/// use listings_backend::inbound::http::token::TokenCodec;
///
/// let tokens = Arc::new(TokenCodec::new(b"secret", Duration::from_secs(60)));
/// let _app = App::new().configure(|cfg| configure(cfg, &tokens));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig, tokens: &Arc<TokenCodec>) {
    let auth = web::scope("/auth")
        .service(register)
        .service(login)
        .service(logout);

    let users = web::scope("/users")
        .wrap(ReadOnlyGuard)
        .wrap(Authenticate::new(tokens.clone()))
        .service(current_user)
        .service(update_user)
        .service(change_password)
        .service(upload_avatar)
        .service(
            web::scope("/admin")
                .wrap(RequireRole::new([Role::Admin]))
                .service(app_stats),
        );

    let listings = web::scope("/listings")
        .wrap(ReadOnlyGuard)
        .wrap(Authenticate::new(tokens.clone()))
        .service(list_listings)
        .service(create_listing)
        .service(get_listing)
        .service(update_listing)
        .service(delete_listing);

    cfg.service(
        web::scope("/api/v1")
            .service(auth)
            .service(users)
            .service(listings),
    );
}
