//! Flat (shared household) model and membership rules.

use crate::time_utils::utc_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest flat that can be created (the admin plus one roommate).
pub const MIN_ROOMMATES: u32 = 2;
/// Largest flat that can be created.
pub const MAX_ROOMMATES: u32 = 20;

/// A shared flat stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flat {
    /// Document ID
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Capacity including the admin
    pub max_roommates: u32,
    /// 6-character join code, reserved in `invite_codes`
    pub invite_code: String,
    pub admin_id: String,
    /// Member user IDs in join order (the admin first)
    pub members: Vec<String>,
    #[serde(with = "utc_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Reservation document keyed by invite code.
///
/// Stored at `invite_codes/{code}`. A code is taken iff this document exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCodeRecord {
    pub code: String,
    pub flat_id: String,
    #[serde(with = "utc_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Reasons a user cannot create or join a flat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipError {
    #[error("invalid invite code")]
    InvalidInviteCode,

    #[error("user {0} has no profile")]
    UnknownUser(String),

    #[error("flat full")]
    FlatFull,

    #[error("already a member of this flat")]
    AlreadyMember,

    #[error("already a member of another flat")]
    AlreadyInFlat,
}

impl Flat {
    /// A new flat whose only member is its admin.
    pub fn new(
        id: String,
        name: &str,
        address: Option<String>,
        max_roommates: u32,
        invite_code: String,
        admin_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            address,
            max_roommates,
            invite_code,
            admin_id: admin_id.to_string(),
            members: vec![admin_id.to_string()],
            created_at: now,
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_roommates as usize
    }

    /// Add a member, enforcing uniqueness and capacity.
    pub fn admit(&mut self, user_id: &str) -> Result<(), MembershipError> {
        if self.is_member(user_id) {
            return Err(MembershipError::AlreadyMember);
        }
        if self.is_full() {
            return Err(MembershipError::FlatFull);
        }
        self.members.push(user_id.to_string());
        Ok(())
    }
}
