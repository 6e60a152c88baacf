// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rotation checker.
//!
//! Finds the rotations of a flat that are due and advances each one in its
//! own Firestore transaction. Safe to run from several requests at once: a
//! due rotation produces exactly one task no matter how many checks race.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Task;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_ROTATIONS: usize = 8;

/// Result of one rotation check over a flat.
#[derive(Debug, Clone, Default)]
pub struct RotationReport {
    /// Tasks created by rotations advanced in this check.
    pub created: Vec<Task>,
    /// Rotations that were due when listed but advanced by someone else first.
    pub skipped: u32,
    /// Rotation IDs whose transaction failed.
    pub failed_ids: Vec<String>,
}

impl RotationReport {
    /// Returns true if no rotation failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_ids.is_empty()
    }
}

/// Service that advances due rotations.
#[derive(Clone)]
pub struct RotationService {
    db: FirestoreDb,
}

impl RotationService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Advance every rotation of `flat_id` that is due at `now`.
    pub async fn check_rotations(&self, flat_id: &str, now: DateTime<Utc>) -> Result<RotationReport> {
        let due = self.db.list_due_rotations(flat_id, now).await?;
        if due.is_empty() {
            tracing::debug!(flat_id, "No rotations due");
            return Ok(RotationReport::default());
        }

        tracing::info!(flat_id, due = due.len(), "Checking due rotations");

        let outcomes = stream::iter(due)
            .map(|rotation| async move {
                let result = self
                    .db
                    .advance_rotation_atomic(flat_id, &rotation.id, now)
                    .await;
                (rotation.id, result)
            })
            .buffer_unordered(MAX_CONCURRENT_ROTATIONS)
            .collect::<Vec<_>>()
            .await;

        let mut report = RotationReport::default();
        for (rotation_id, outcome) in outcomes {
            match outcome {
                Ok(Some(task)) => report.created.push(task),
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        flat_id,
                        rotation_id = %rotation_id,
                        error = %e,
                        "Failed to advance rotation"
                    );
                    report.failed_ids.push(rotation_id);
                }
            }
        }
        report
            .created
            .sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

        tracing::info!(
            flat_id,
            created = report.created.len(),
            skipped = report.skipped,
            failed = report.failed_ids.len(),
            "Rotation check finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_offline_db_surfaces_database_error() {
        let service = RotationService::new(FirestoreDb::new_mock());
        let err = service
            .check_rotations("flat-1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_report_success_flag() {
        let mut report = RotationReport::default();
        assert!(report.is_complete_success());
        report.failed_ids.push("rot".to_string());
        assert!(!report.is_complete_success());
    }
}
