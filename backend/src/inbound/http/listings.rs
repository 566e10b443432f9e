//! Listings API handlers.
//!
//! ```text
//! GET /api/v1/listings
//! POST /api/v1/listings {"title":"Bike","description":"Blue","price":"120","avatar":"data:image/png;base64,..."}
//! GET /api/v1/listings/{id}
//! PATCH /api/v1/listings/{id} {"title":"Bike","images":[],"location":"Leeds","description":"Blue","price":"100"}
//! DELETE /api/v1/listings/{id}
//! ```
//!
//! Routes taking `{id}` run the listing-access rule first, so handlers only
//! see listings that exist and that the caller may act on.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{ApiResult, Error, Identity, ListingDraft, ListingId, Role};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::custom::INVALID_ID;
use crate::inbound::http::validation::{CreateListing, ListingById, UpdateListing, Validated};

fn listing_id<E>(input: &Validated<E>) -> ApiResult<ListingId> {
    input
        .param("id")
        .and_then(|raw| ListingId::parse(raw).ok())
        .ok_or_else(|| Error::invalid_request(INVALID_ID))
}

/// Listings visible to the caller: all of them for admins, otherwise their
/// own, oldest first.
#[get("")]
pub async fn list_listings(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<HttpResponse> {
    let listings: Vec<_> = state
        .listings
        .list()
        .await?
        .into_iter()
        .filter(|listing| {
            identity.role() == Role::Admin || listing.created_by == *identity.user_id()
        })
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "count": listings.len(), "listings": listings })))
}

/// Create a listing owned by the caller.
#[post("")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    identity: Identity,
    input: Validated<CreateListing>,
) -> ApiResult<HttpResponse> {
    let draft: ListingDraft = input.body()?;
    let listing = state.listings.create(identity.user_id(), draft).await?;
    info!(listing_id = %listing.id, user_id = %identity.user_id(), "listing created");
    Ok(HttpResponse::Created().json(json!({ "listing": listing })))
}

/// One listing.
#[get("/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    input: Validated<ListingById>,
) -> ApiResult<HttpResponse> {
    let id = listing_id(&input)?;
    let listing = state
        .listings
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found(format!("no listing with id {id}")))?;
    Ok(HttpResponse::Ok().json(json!({ "listing": listing })))
}

/// Replace a listing's editable fields.
#[patch("/{id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    input: Validated<UpdateListing>,
) -> ApiResult<HttpResponse> {
    let id = listing_id(&input)?;
    let draft: ListingDraft = input.body()?;
    let listing = state.listings.update(&id, draft).await?;
    info!(listing_id = %id, "listing updated");
    Ok(HttpResponse::Ok().json(json!({ "msg": "listing modified", "listing": listing })))
}

/// Remove a listing.
#[delete("/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    input: Validated<ListingById>,
) -> ApiResult<HttpResponse> {
    let id = listing_id(&input)?;
    let listing = state.listings.delete(&id).await?;
    info!(listing_id = %id, "listing deleted");
    Ok(HttpResponse::Ok().json(json!({ "msg": "listing deleted", "listing": listing })))
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
