// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resolution of the caller's flat membership.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;

/// The authenticated user together with the flat they belong to.
///
/// Flat-scoped operations take this explicitly instead of reading any
/// session state of their own.
#[derive(Debug, Clone)]
pub struct MemberContext {
    pub user_id: String,
    pub flat_id: String,
    pub is_admin: bool,
}

impl MemberContext {
    /// Build a context from a stored profile.
    ///
    /// Fails with `Forbidden` if the user has not joined a flat yet.
    pub fn from_user(user: &User) -> Result<Self> {
        let flat_id = user
            .flat_id
            .clone()
            .ok_or_else(|| AppError::Forbidden("user has not joined a flat".to_string()))?;

        Ok(Self {
            user_id: user.id.clone(),
            flat_id,
            is_admin: user.is_admin,
        })
    }

    /// Look up the caller's profile and flat.
    pub async fn resolve(db: &FirestoreDb, auth: &AuthUser) -> Result<Self> {
        let user = db
            .get_user(&auth.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
        Self::from_user(&user)
    }
}
