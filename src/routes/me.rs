// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for the signed-in user.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Profile routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).post(register))
        .route("/api/me/push-token", put(update_push_token))
}

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub flat_id: Option<String>,
    pub is_admin: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            flat_id: user.flat_id,
            is_admin: user.is_admin,
            points: user.points,
            created_at: format_utc_rfc3339(user.created_at),
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct PushTokenRequest {
    #[validate(length(min = 1, max = 4096))]
    pub token: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(profile.into()))
}

/// Create the profile document after sign-up.
///
/// Idempotent: an existing profile is returned unchanged with 200.
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    body.validate()?;
    let email = body.email.trim().to_ascii_lowercase();

    let (profile, created) = state
        .db
        .register_user(&user.user_id, &email, chrono::Utc::now())
        .await?;

    let status = if created {
        tracing::info!(user_id = %user.user_id, "User profile created");
        StatusCode::CREATED
    } else {
        tracing::debug!(user_id = %user.user_id, "User profile already exists");
        StatusCode::OK
    };

    Ok((status, Json(profile.into())))
}

/// Store the device's push notification token.
async fn update_push_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PushTokenRequest>,
) -> Result<Json<UserResponse>> {
    body.validate()?;
    let token = crate::routes::required_text(&body.token, "token")?;

    let profile = state
        .db
        .set_push_token(&user.user_id, &token, chrono::Utc::now())
        .await?;

    tracing::info!(user_id = %user.user_id, "Push token updated");

    Ok(Json(profile.into()))
}
