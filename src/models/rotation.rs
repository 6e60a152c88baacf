//! Rotation config: how a recurring chore cycles through flat members.

use crate::models::task::{TaskCategory, DEFAULT_TASK_POINTS};
use crate::time_utils::{days_after, utc_seconds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rotation config stored at `flats/{flat_id}/rotations/{id}`.
///
/// The ID matches the task that started the rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rotation {
    pub id: String,
    pub task_name: String,
    pub category: TaskCategory,
    /// Members in rotation order
    pub members: Vec<String>,
    /// Index into `members` of the current assignee
    pub current_index: usize,
    pub rotation_days: u32,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(with = "utc_seconds")]
    pub last_rotation: DateTime<Utc>,
    #[serde(with = "utc_seconds")]
    pub next_rotation: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Incremented on every advance
    #[serde(default)]
    pub version: u64,
}

fn default_points() -> u32 {
    DEFAULT_TASK_POINTS
}

fn default_active() -> bool {
    true
}

/// Outcome of advancing a rotation by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStep {
    /// Member who gets the next task
    pub assignee: String,
    /// Due date of the next task
    pub due_date: DateTime<Utc>,
    /// Rotation version after the step
    pub version: u64,
}

impl Rotation {
    /// Whether the rotation should produce a new task at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.members.is_empty() && self.next_rotation <= now
    }

    /// Index of the member after the current one.
    ///
    /// Always a valid index when there is at least one member, even if
    /// `current_index` is stale because the member list shrank.
    pub fn next_index(&self) -> Option<usize> {
        if self.members.is_empty() {
            None
        } else {
            let len = self.members.len();
            Some((self.current_index % len + 1) % len)
        }
    }

    /// Move to the next member and reschedule.
    ///
    /// Returns `None` (leaving the rotation untouched) if it is not due.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<RotationStep> {
        if !self.is_due(now) {
            return None;
        }
        let next_index = self.next_index()?;
        let due_date = days_after(now, self.rotation_days);

        self.current_index = next_index;
        self.last_rotation = now;
        self.next_rotation = due_date;
        self.version += 1;

        Some(RotationStep {
            assignee: self.members[next_index].clone(),
            due_date,
            version: self.version,
        })
    }

    /// Document ID of the task produced by the step that reached `version`.
    pub fn task_id_for_version(&self, version: u64) -> String {
        format!("{}-r{}", self.id, version)
    }
}
