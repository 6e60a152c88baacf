//! User model for storage and API.

use crate::time_utils::utc_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The document ID is the auth provider's user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Auth provider user ID (also used as document ID)
    pub id: String,
    pub email: String,
    /// Flat the user belongs to, if any
    #[serde(default)]
    pub flat_id: Option<String>,
    /// Whether the user created (administers) their flat
    #[serde(default)]
    pub is_admin: bool,
    /// Points earned by completing chores
    #[serde(default)]
    pub points: u64,
    /// Push notification token of the user's current device
    #[serde(default)]
    pub push_token: Option<String>,
    #[serde(default, with = "utc_seconds::option")]
    pub push_token_updated_at: Option<DateTime<Utc>>,
    #[serde(with = "utc_seconds")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly signed-up user with no flat.
    pub fn new(id: &str, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            flat_id: None,
            is_admin: false,
            points: 0,
            push_token: None,
            push_token_updated_at: None,
            created_at: now,
        }
    }

    /// Credit points for a completed chore.
    pub fn credit_points(&mut self, points: u32) {
        self.points = self.points.saturating_add(u64::from(points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document_defaults() {
        // Documents written before flats existed only carry id, email and creation time.
        let json = r#"{"id":"u1","email":"a@example.com","created_at":"2024-01-01T00:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.flat_id, None);
        assert!(!user.is_admin);
        assert_eq!(user.points, 0);
        assert!(user.push_token_updated_at.is_none());
    }

    #[test]
    fn test_credit_points_accumulates() {
        let mut user = User::new("u1", "a@example.com", Utc::now());
        user.credit_points(10);
        user.credit_points(5);
        assert_eq!(user.points, 15);
    }
}
