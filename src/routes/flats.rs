// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat creation, joining by invite code, and flat details.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::flat::{MAX_ROOMMATES, MIN_ROOMMATES};
use crate::models::Flat;
use crate::routes::required_text;
use crate::services::codes::normalize_invite_code;
use crate::services::MemberContext;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/flats", post(create_flat))
        .route("/api/flats/join", post(join_flat))
        .route("/api/flat", get(get_flat))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct FlatResponse {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub max_roommates: u32,
    pub invite_code: String,
    pub admin_id: String,
    pub members: Vec<String>,
    pub created_at: String,
}

impl From<Flat> for FlatResponse {
    fn from(flat: Flat) -> Self {
        Self {
            id: flat.id,
            name: flat.name,
            address: flat.address,
            max_roommates: flat.max_roommates,
            invite_code: flat.invite_code,
            admin_id: flat.admin_id,
            members: flat.members,
            created_at: format_utc_rfc3339(flat.created_at),
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateFlatRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(range(min = MIN_ROOMMATES, max = MAX_ROOMMATES))]
    pub max_roommates: u32,
}

#[derive(Deserialize)]
pub struct JoinFlatRequest {
    pub invite_code: String,
}

/// Create a flat with the caller as admin and sole member.
async fn create_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateFlatRequest>,
) -> Result<(StatusCode, Json<FlatResponse>)> {
    body.validate()?;
    let name = required_text(&body.name, "name")?;
    let address = body
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let flat = state
        .db
        .create_flat_atomic(
            &user.user_id,
            &name,
            address,
            body.max_roommates,
            &state.codes,
            chrono::Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(flat.into())))
}

/// Join the flat identified by an invite code.
async fn join_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<JoinFlatRequest>,
) -> Result<Json<FlatResponse>> {
    let code = normalize_invite_code(&body.invite_code).ok_or_else(|| {
        AppError::BadRequest("invite code must be 6 letters or digits".to_string())
    })?;

    let flat = state.db.join_flat_atomic(&user.user_id, &code).await?;

    Ok(Json(flat.into()))
}

/// Details of the caller's flat.
async fn get_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FlatResponse>> {
    let ctx = MemberContext::resolve(&state.db, &user).await?;

    let flat = state
        .db
        .get_flat(&ctx.flat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", ctx.flat_id)))?;

    Ok(Json(flat.into()))
}
