//! Chore task model and its lifecycle.

use crate::time_utils::utc_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Points awarded when a task does not say otherwise.
pub const DEFAULT_TASK_POINTS: u32 = 10;

/// Chore categories offered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Cleaning,
    Trash,
    Bathroom,
    Shopping,
    #[serde(other)]
    Other,
}

/// Whether a task came from a rotation or was added by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Predefined,
    Custom,
}

/// Stored task status.
///
/// `Overdue` is never written; it is derived at read time by
/// [`Task::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Overdue,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Completed => "completed",
        }
    }
}

/// A chore stored at `flats/{flat_id}/tasks/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Document ID
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub category: TaskCategory,
    /// User ID of the member responsible
    pub assigned_to: String,
    pub status: TaskStatus,
    #[serde(with = "utc_seconds")]
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_points")]
    pub points: u32,
    /// Member who created the task by hand (None for rotated tasks)
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(with = "utc_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "utc_seconds::option")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Rotation that produced this task
    #[serde(default)]
    pub rotation_id: Option<String>,
}

fn default_points() -> u32 {
    DEFAULT_TASK_POINTS
}

/// Reasons a completion is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("only the assignee can complete this task")]
    NotAssignee,

    #[error("task already completed")]
    AlreadyCompleted,
}

impl Task {
    /// Status as presented to clients at `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> TaskStatus {
        match self.status {
            TaskStatus::Pending if self.due_date < now => TaskStatus::Overdue,
            status => status,
        }
    }

    /// Mark the task completed by `user_id`.
    ///
    /// Returns the points to credit to the assignee.
    pub fn complete(&mut self, user_id: &str, now: DateTime<Utc>) -> Result<u32, CompletionError> {
        if self.status == TaskStatus::Completed {
            return Err(CompletionError::AlreadyCompleted);
        }
        if self.assigned_to != user_id {
            return Err(CompletionError::NotAssignee);
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        Ok(self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_task(assignee: &str, due: DateTime<Utc>) -> Task {
        Task {
            id: "t1".to_string(),
            name: "Take out trash".to_string(),
            kind: TaskKind::Custom,
            category: TaskCategory::Trash,
            assigned_to: assignee.to_string(),
            status: TaskStatus::Pending,
            due_date: due,
            points: 15,
            created_by: Some("admin".to_string()),
            created_at: due - Duration::days(3),
            completed_at: None,
            rotation_id: None,
        }
    }

    #[test]
    fn test_complete_credits_points_once() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut task = make_task("alice", now + Duration::days(1));

        assert_eq!(task.complete("alice", now), Ok(15));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(now));

        assert_eq!(
            task.complete("alice", now),
            Err(CompletionError::AlreadyCompleted)
        );
    }

    #[test]
    fn test_only_assignee_can_complete() {
        let now = Utc::now();
        let mut task = make_task("alice", now);

        assert_eq!(task.complete("bob", now), Err(CompletionError::NotAssignee));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_effective_status_derives_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let late = make_task("alice", now - Duration::hours(1));
        let on_time = make_task("alice", now + Duration::hours(1));

        assert_eq!(late.effective_status(now), TaskStatus::Overdue);
        assert_eq!(on_time.effective_status(now), TaskStatus::Pending);
        // Stored status stays pending
        assert_eq!(late.status, TaskStatus::Pending);
    }

    #[test]
    fn test_overdue_task_can_still_be_completed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut task = make_task("alice", now - Duration::days(2));

        assert_eq!(task.complete("alice", now), Ok(15));
    }

    #[test]
    fn test_unknown_category_reads_as_other() {
        let category: TaskCategory = serde_json::from_str(r#""garden""#).unwrap();
        assert_eq!(category, TaskCategory::Other);
    }
}
