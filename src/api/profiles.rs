// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{ProfileResponse, UpdateProfileRequest},
    state::AppState,
    storage::{AccountId, ProfileChanges, ProfileRepository},
};

#[utoipa::path(
    get,
    path = "/v1/user/profile/{account_id}",
    params(("account_id" = u64, Path, description = "Account identifier")),
    tag = "Profiles",
    responses(
        (status = 200, body = ProfileResponse),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = ProfileRepository::new(&state.store)
        .get(account_id)?
        .ok_or_else(|| ApiError::not_found("User profile not found."))?;

    Ok(Json(ProfileResponse {
        message: None,
        profile,
    }))
}

#[utoipa::path(
    put,
    path = "/v1/user/profile",
    request_body = UpdateProfileRequest,
    tag = "Profiles",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(account): Auth,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(request) = payload?;

    let profile = ProfileRepository::new(&state.store).upsert(
        account.account_id,
        ProfileChanges {
            bio: request.bio,
            avatar_url: request.avatar_url,
        },
    )?;

    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully.".to_string()),
        profile,
    }))
}
