//! Users API handlers.
//!
//! ```text
//! GET /api/v1/users/current-user
//! PATCH /api/v1/users/update-user {"name":"Ada","email":"ada@example.com","location":"London"}
//! PATCH /api/v1/users/change-password {"oldPassword":"secret123","newPassword":"secret456"}
//! POST /api/v1/users/avatar (multipart, field "avatar")
//! GET /api/v1/users/admin/app-stats
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, patch, post, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::domain::{ApiResult, Error, Identity, ProfileUpdate, UserAccount};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::upload::read_single_upload;
use crate::inbound::http::validation::{ChangePassword, UpdateUser, Validated};

/// Multipart field carrying the avatar file.
pub const AVATAR_FIELD: &str = "avatar";

async fn load_account(state: &HttpState, identity: &Identity) -> ApiResult<UserAccount> {
    let id = identity.user_id();
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("no user with id {id}")))
}

/// The caller's account.
#[get("/current-user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<HttpResponse> {
    let user = load_account(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// Replace the caller's profile fields.
#[patch("/update-user")]
pub async fn update_user(
    state: web::Data<HttpState>,
    identity: Identity,
    input: Validated<UpdateUser>,
) -> ApiResult<HttpResponse> {
    let update: ProfileUpdate = input.body()?;
    let user = state
        .users
        .update_profile(identity.user_id(), update)
        .await?;
    info!(user_id = %user.id, "profile updated");
    Ok(HttpResponse::Ok().json(json!({ "msg": "user updated", "user": user })))
}

/// Change-password body. `oldPassword` is checked by the rules.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Replace the caller's password.
#[patch("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    identity: Identity,
    input: Validated<ChangePassword>,
) -> ApiResult<HttpResponse> {
    let ChangePasswordRequest { new_password } = input.body()?;
    state
        .users
        .set_password(identity.user_id(), &new_password)
        .await?;
    info!(user_id = %identity.user_id(), "password changed");
    Ok(HttpResponse::Ok().json(json!({ "msg": "password updated" })))
}

/// Store an uploaded JPEG/PNG as the caller's avatar.
#[post("/avatar")]
pub async fn upload_avatar(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let upload = read_single_upload(payload, AVATAR_FIELD, &state.uploads).await?;
    let size = upload.len();
    let user = state
        .users
        .set_avatar(identity.user_id(), upload.into_data_uri())
        .await?;
    info!(user_id = %user.id, size, "avatar replaced");
    Ok(HttpResponse::Ok().json(json!({ "msg": "avatar updated", "user": user })))
}

/// Account and listing totals. Admin only.
#[get("/app-stats")]
pub async fn app_stats(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state.users.count().await?;
    let listings = state.listings.count().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users, "listings": listings })))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
