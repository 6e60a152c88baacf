// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chore tasks and rotation checks for the caller's flat.

use crate::db::NewTask;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Rotation, Task, TaskCategory, TaskKind, TaskStatus};
use crate::models::task::DEFAULT_TASK_POINTS;
use crate::routes::{required_text, validate_document_id};
use crate::services::MemberContext;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_ROTATION_DAYS: u32 = 365;
const MAX_TASK_POINTS: u32 = 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/flat/tasks", get(list_tasks).post(create_task))
        .route("/api/flat/tasks/{task_id}/complete", post(complete_task))
        .route("/api/flat/rotations/check", post(check_rotations))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub category: TaskCategory,
    pub assigned_to: String,
    /// Overdue is reported for pending tasks past their due date
    pub status: TaskStatus,
    pub due_date: String,
    pub points: u32,
    pub completed_at: Option<String>,
    pub rotation_id: Option<String>,
}

impl TaskResponse {
    fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            status: task.effective_status(now),
            id: task.id,
            name: task.name,
            kind: task.kind,
            category: task.category,
            assigned_to: task.assigned_to,
            due_date: format_utc_rfc3339(task.due_date),
            points: task.points,
            completed_at: task.completed_at.map(format_utc_rfc3339),
            rotation_id: task.rotation_id,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct TasksResponse {
    pub tasks: Vec<TaskResponse>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct RotationSummary {
    pub id: String,
    pub members: Vec<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub current_index: u64,
    pub rotation_days: u32,
    pub next_rotation: String,
}

impl From<Rotation> for RotationSummary {
    fn from(rotation: Rotation) -> Self {
        Self {
            id: rotation.id,
            members: rotation.members,
            current_index: rotation.current_index as u64,
            rotation_days: rotation.rotation_days,
            next_rotation: format_utc_rfc3339(rotation.next_rotation),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct CreateTaskResponse {
    pub task: TaskResponse,
    pub rotation: RotationSummary,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct CompleteTaskResponse {
    pub task: TaskResponse,
    pub points_awarded: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: u64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct RotationCheckResponse {
    pub created: Vec<TaskResponse>,
    pub skipped: u32,
    pub failed: Vec<String>,
}

#[derive(Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: TaskCategory,
    #[validate(range(min = 1, max = MAX_ROTATION_DAYS))]
    pub rotation_days: u32,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, max = MAX_TASK_POINTS))]
    pub points: u32,
}

fn default_points() -> u32 {
    DEFAULT_TASK_POINTS
}

/// Open tasks of the caller's flat, earliest due first.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TasksResponse>> {
    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let now = Utc::now();

    let tasks = state
        .db
        .list_open_tasks(&ctx.flat_id)
        .await?
        .into_iter()
        .map(|task| TaskResponse::from_task(task, now))
        .collect();

    Ok(Json(TasksResponse { tasks }))
}

/// Create a custom task and its rotation.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>)> {
    body.validate()?;
    let name = required_text(&body.name, "name")?;

    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let now = Utc::now();
    let task_id = state.codes.document_id()?;
    let new_task = NewTask {
        name,
        category: body.category,
        rotation_days: body.rotation_days,
        points: body.points,
    };

    let (task, rotation) = state
        .db
        .create_task_atomic(&ctx.flat_id, &ctx.user_id, &new_task, task_id, now)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            task: TaskResponse::from_task(task, now),
            rotation: rotation.into(),
        }),
    ))
}

/// Mark a task completed and credit its points to the caller.
async fn complete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<Json<CompleteTaskResponse>> {
    validate_document_id(&task_id, "task")?;

    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let now = Utc::now();

    let (task, profile) = state
        .db
        .complete_task_atomic(&ctx.flat_id, &task_id, &ctx.user_id, now)
        .await?;

    Ok(Json(CompleteTaskResponse {
        points_awarded: task.points,
        total_points: profile.points,
        task: TaskResponse::from_task(task, now),
    }))
}

/// Advance every due rotation of the caller's flat.
async fn check_rotations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RotationCheckResponse>> {
    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let now = Utc::now();

    let report = state
        .rotation_service
        .check_rotations(&ctx.flat_id, now)
        .await?;
    if !report.is_complete_success() {
        tracing::warn!(
            flat_id = %ctx.flat_id,
            failed = report.failed_ids.len(),
            "Some rotations could not be advanced"
        );
    }

    Ok(Json(RotationCheckResponse {
        created: report
            .created
            .into_iter()
            .map(|task| TaskResponse::from_task(task, now))
            .collect(),
        skipped: report.skipped,
        failed: report.failed_ids,
    }))
}
