// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, flat membership, points)
//! - Flats and invite code reservations
//! - Tasks and rotation configs (`flats/{id}/tasks`, `flats/{id}/rotations`)
//! - Expenses (`flats/{id}/expenses`)
//!
//! Every read-check-write sequence runs inside `run_transaction`, so the
//! reads are registered for conflict detection and Firestore retries the
//! closure with fresh data when another writer got there first.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Expense, ExpenseCategory, Flat, InviteCodeRecord, MembershipError, Rotation, Task,
    TaskCategory, TaskKind, TaskStatus, User,
};
use crate::services::codes::CodeGenerator;
use crate::time_utils::{days_after, format_utc_rfc3339};
use chrono::{DateTime, Utc};
use futures_util::FutureExt;

/// Fresh invite codes tried before giving up on creating a flat.
const INVITE_CODE_ATTEMPTS: usize = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Input for a hand-created task and its rotation.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub category: TaskCategory,
    pub rotation_days: u32,
    pub points: u32,
}

/// Input for a new expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
}

fn db_error(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Path of a flat document, used as parent for its subcollections.
    fn flat_path(&self, flat_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::FLATS, flat_id)
            .map_err(db_error)
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(db_error)
    }

    /// Create the user's profile unless it already exists.
    ///
    /// Returns the stored profile and whether it was created by this call.
    pub async fn register_user(
        &self,
        user_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(User, bool), AppError> {
        self.get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                let email = email.to_string();
                async move {
                    let existing: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    if let Some(user) = existing {
                        return Ok((user, false));
                    }

                    let user = User::new(&user_id, &email, now);
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;
                    Ok((user, true))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Register transaction failed: {}", e)))
    }

    /// Store the push notification token of the user's device.
    pub async fn set_push_token(
        &self,
        user_id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        self.get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                let token = token.to_string();
                async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(mut user) = user else {
                        return Ok(Err(AppError::from(MembershipError::UnknownUser(user_id))));
                    };

                    user.push_token = Some(token);
                    user.push_token_updated_at = Some(now);
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;
                    Ok(Ok(user))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Push token transaction failed: {}", e)))?
    }

    // ─── Flat Operations ─────────────────────────────────────────

    /// Get a flat by ID.
    pub async fn get_flat(&self, flat_id: &str) -> Result<Option<Flat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FLATS)
            .obj()
            .one(flat_id)
            .await
            .map_err(db_error)
    }

    /// Atomically create a flat administered by `user_id`.
    ///
    /// Reserves a unique invite code, writes the flat and links the user to it.
    /// Fails with [`MembershipError::AlreadyInFlat`] if the user already has a flat.
    pub async fn create_flat_atomic(
        &self,
        user_id: &str,
        name: &str,
        address: Option<&str>,
        max_roommates: u32,
        codes: &CodeGenerator,
        now: DateTime<Utc>,
    ) -> Result<Flat, AppError> {
        let flat_id = codes.document_id()?;
        let candidates = (0..INVITE_CODE_ATTEMPTS)
            .map(|_| codes.invite_code())
            .collect::<Result<Vec<_>, _>>()?;

        let flat = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                let name = name.to_string();
                let address = address.map(str::to_string);
                let flat_id = flat_id.clone();
                let candidates = candidates.clone();
                async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(mut user) = user else {
                        return Ok(Err(AppError::from(MembershipError::UnknownUser(user_id))));
                    };
                    if user.flat_id.is_some() {
                        return Ok(Err(AppError::from(MembershipError::AlreadyInFlat)));
                    }

                    let mut free_code = None;
                    for code in candidates {
                        let taken: Option<InviteCodeRecord> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::INVITE_CODES)
                            .obj()
                            .one(&code)
                            .await?;
                        if taken.is_none() {
                            free_code = Some(code);
                            break;
                        }
                    }
                    let Some(code) = free_code else {
                        return Ok(Err(AppError::Conflict(
                            "Could not allocate a unique invite code".to_string(),
                        )));
                    };

                    let flat = Flat::new(
                        flat_id,
                        &name,
                        address,
                        max_roommates,
                        code.clone(),
                        &user_id,
                        now,
                    );
                    let record = InviteCodeRecord {
                        code: code.clone(),
                        flat_id: flat.id.clone(),
                        created_at: now,
                    };
                    user.flat_id = Some(flat.id.clone());
                    user.is_admin = true;

                    db.fluent()
                        .update()
                        .in_col(collections::FLATS)
                        .document_id(&flat.id)
                        .object(&flat)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::INVITE_CODES)
                        .document_id(&code)
                        .object(&record)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(Ok(flat))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Create flat transaction failed: {}", e)))??;

        tracing::info!(
            flat_id = %flat.id,
            admin_id = user_id,
            max_roommates,
            "Flat created"
        );

        Ok(flat)
    }

    /// Atomically add `user_id` to the flat reserved under `code`.
    ///
    /// Capacity, duplicate membership and single-flat membership are checked
    /// against transactional reads, so two users racing for the last slot
    /// cannot both succeed.
    pub async fn join_flat_atomic(&self, user_id: &str, code: &str) -> Result<Flat, AppError> {
        let flat = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                let code = code.to_string();
                async move {
                    let record: Option<InviteCodeRecord> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::INVITE_CODES)
                        .obj()
                        .one(&code)
                        .await?;
                    let Some(record) = record else {
                        return Ok(Err(AppError::from(MembershipError::InvalidInviteCode)));
                    };

                    let flat: Option<Flat> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::FLATS)
                        .obj()
                        .one(&record.flat_id)
                        .await?;
                    let Some(mut flat) = flat else {
                        return Ok(Err(AppError::from(MembershipError::InvalidInviteCode)));
                    };

                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(mut user) = user else {
                        return Ok(Err(AppError::from(MembershipError::UnknownUser(user_id))));
                    };
                    if user.flat_id.as_deref().is_some_and(|id| id != flat.id) {
                        return Ok(Err(AppError::from(MembershipError::AlreadyInFlat)));
                    }

                    if let Err(e) = flat.admit(&user_id) {
                        return Ok(Err(AppError::from(e)));
                    }
                    user.flat_id = Some(flat.id.clone());
                    user.is_admin = false;

                    db.fluent()
                        .update()
                        .in_col(collections::FLATS)
                        .document_id(&flat.id)
                        .object(&flat)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(Ok(flat))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Join transaction failed: {}", e)))??;

        tracing::info!(
            flat_id = %flat.id,
            user_id,
            members = flat.members.len(),
            "Member joined flat"
        );

        Ok(flat)
    }

    // ─── Task Operations ─────────────────────────────────────────

    /// Get a task by ID.
    pub async fn get_task(&self, flat_id: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        let parent = self.flat_path(flat_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TASKS)
            .parent(&parent)
            .obj()
            .one(task_id)
            .await
            .map_err(db_error)
    }

    /// All tasks of a flat that are not completed, earliest due first.
    pub async fn list_open_tasks(&self, flat_id: &str) -> Result<Vec<Task>, AppError> {
        let parent = self.flat_path(flat_id)?;
        let mut tasks: Vec<Task> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TASKS)
            .parent(&parent)
            .filter(|q| q.for_all([q.field("status").eq(TaskStatus::Pending.as_str())]))
            .obj()
            .query()
            .await
            .map_err(db_error)?;

        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Atomically create a task assigned to the first flat member plus the
    /// rotation config that will cycle it through the rest.
    pub async fn create_task_atomic(
        &self,
        flat_id: &str,
        created_by: &str,
        new_task: &NewTask,
        task_id: String,
        now: DateTime<Utc>,
    ) -> Result<(Task, Rotation), AppError> {
        let created = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let flat_id = flat_id.to_string();
                let created_by = created_by.to_string();
                let new_task = new_task.clone();
                let task_id = task_id.clone();
                async move {
                    let flat: Option<Flat> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::FLATS)
                        .obj()
                        .one(&flat_id)
                        .await?;
                    let Some(flat) = flat else {
                        return Ok(Err(AppError::NotFound(format!("Flat {} not found", flat_id))));
                    };
                    if !flat.is_member(&created_by) {
                        return Ok(Err(AppError::Forbidden(
                            "not a member of this flat".to_string(),
                        )));
                    }
                    let Some(first) = flat.members.first() else {
                        return Ok(Err(AppError::Conflict("flat has no members".to_string())));
                    };

                    let due_date = days_after(now, new_task.rotation_days);
                    let task = Task {
                        id: task_id.clone(),
                        name: new_task.name.clone(),
                        kind: TaskKind::Custom,
                        category: new_task.category,
                        assigned_to: first.clone(),
                        status: TaskStatus::Pending,
                        due_date,
                        points: new_task.points,
                        created_by: Some(created_by),
                        created_at: now,
                        completed_at: None,
                        rotation_id: Some(task_id.clone()),
                    };
                    let rotation = Rotation {
                        id: task_id,
                        task_name: new_task.name,
                        category: new_task.category,
                        members: flat.members.clone(),
                        current_index: 0,
                        rotation_days: new_task.rotation_days,
                        points: new_task.points,
                        last_rotation: now,
                        next_rotation: due_date,
                        active: true,
                        version: 0,
                    };

                    let parent = db.parent_path(collections::FLATS, &flat_id)?;
                    db.fluent()
                        .update()
                        .in_col(collections::TASKS)
                        .document_id(&task.id)
                        .parent(&parent)
                        .object(&task)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::ROTATIONS)
                        .document_id(&rotation.id)
                        .parent(&parent)
                        .object(&rotation)
                        .add_to_transaction(transaction)?;

                    Ok(Ok((task, rotation)))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Create task transaction failed: {}", e)))??;

        tracing::info!(
            flat_id,
            task_id = %created.0.id,
            assigned_to = %created.0.assigned_to,
            rotation_days = created.1.rotation_days,
            "Task and rotation created"
        );

        Ok(created)
    }

    /// Atomically complete a task and credit its points to the assignee.
    ///
    /// Returns the completed task and the assignee's updated profile.
    pub async fn complete_task_atomic(
        &self,
        flat_id: &str,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Task, User), AppError> {
        let completed = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let flat_id = flat_id.to_string();
                let task_id = task_id.to_string();
                let user_id = user_id.to_string();
                async move {
                    let parent = db.parent_path(collections::FLATS, &flat_id)?;
                    let task: Option<Task> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::TASKS)
                        .parent(&parent)
                        .obj()
                        .one(&task_id)
                        .await?;
                    let Some(mut task) = task else {
                        return Ok(Err(AppError::NotFound(format!("Task {} not found", task_id))));
                    };

                    let points = match task.complete(&user_id, now) {
                        Ok(points) => points,
                        Err(e) => return Ok(Err(AppError::from(e))),
                    };

                    let assignee: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&task.assigned_to)
                        .await?;
                    let Some(mut assignee) = assignee else {
                        return Ok(Err(AppError::from(
                            MembershipError::UnknownUser(task.assigned_to.clone()),
                        )));
                    };
                    assignee.credit_points(points);

                    db.fluent()
                        .update()
                        .in_col(collections::TASKS)
                        .document_id(&task.id)
                        .parent(&parent)
                        .object(&task)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&assignee.id)
                        .object(&assignee)
                        .add_to_transaction(transaction)?;

                    Ok(Ok((task, assignee)))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Complete task transaction failed: {}", e)))??;

        tracing::info!(
            flat_id,
            task_id,
            user_id,
            points = completed.0.points,
            total_points = completed.1.points,
            "Task completed"
        );

        Ok(completed)
    }

    // ─── Rotation Operations ─────────────────────────────────────

    /// Get a rotation config by ID.
    pub async fn get_rotation(
        &self,
        flat_id: &str,
        rotation_id: &str,
    ) -> Result<Option<Rotation>, AppError> {
        let parent = self.flat_path(flat_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ROTATIONS)
            .parent(&parent)
            .obj()
            .one(rotation_id)
            .await
            .map_err(db_error)
    }

    /// Active rotations of a flat whose next rotation is at or before `now`.
    pub async fn list_due_rotations(
        &self,
        flat_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Rotation>, AppError> {
        let parent = self.flat_path(flat_id)?;
        let now_str = format_utc_rfc3339(now);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROTATIONS)
            .parent(&parent)
            .filter(move |q| {
                q.for_all([
                    q.field("active").eq(true),
                    q.field("next_rotation").less_than_or_equal(now_str.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Advance one rotation if it is still due, creating the next task.
    ///
    /// The rotation is re-read inside the transaction, so when several
    /// requests race on the same due rotation exactly one advances it; the
    /// others see the new `next_rotation` and return `None`. The task ID is
    /// derived from the rotation version, so a replay rewrites the same task.
    pub async fn advance_rotation_atomic(
        &self,
        flat_id: &str,
        rotation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, AppError> {
        let created = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let flat_id = flat_id.to_string();
                let rotation_id = rotation_id.to_string();
                async move {
                    let parent = db.parent_path(collections::FLATS, &flat_id)?;
                    let rotation: Option<Rotation> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::ROTATIONS)
                        .parent(&parent)
                        .obj()
                        .one(&rotation_id)
                        .await?;
                    let Some(mut rotation) = rotation else {
                        return Ok(None);
                    };
                    let Some(step) = rotation.advance(now) else {
                        return Ok(None);
                    };

                    let task = Task {
                        id: rotation.task_id_for_version(step.version),
                        name: rotation.task_name.clone(),
                        kind: TaskKind::Predefined,
                        category: rotation.category,
                        assigned_to: step.assignee,
                        status: TaskStatus::Pending,
                        due_date: step.due_date,
                        points: rotation.points,
                        created_by: None,
                        created_at: now,
                        completed_at: None,
                        rotation_id: Some(rotation.id.clone()),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::TASKS)
                        .document_id(&task.id)
                        .parent(&parent)
                        .object(&task)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::ROTATIONS)
                        .document_id(&rotation.id)
                        .parent(&parent)
                        .object(&rotation)
                        .add_to_transaction(transaction)?;

                    Ok(Some(task))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Rotation transaction failed: {}", e)))?;

        match &created {
            Some(task) => tracing::info!(
                flat_id,
                rotation_id,
                task_id = %task.id,
                assigned_to = %task.assigned_to,
                "Rotation advanced"
            ),
            None => tracing::debug!(flat_id, rotation_id, "Rotation no longer due (skipped)"),
        }

        Ok(created)
    }

    // ─── Expense Operations ──────────────────────────────────────

    /// Atomically record an expense split evenly among the flat's current members.
    pub async fn create_expense_atomic(
        &self,
        flat_id: &str,
        paid_by: &str,
        new_expense: &NewExpense,
        expense_id: String,
        now: DateTime<Utc>,
    ) -> Result<Expense, AppError> {
        let expense = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let flat_id = flat_id.to_string();
                let paid_by = paid_by.to_string();
                let new_expense = new_expense.clone();
                let expense_id = expense_id.clone();
                async move {
                    let flat: Option<Flat> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::FLATS)
                        .obj()
                        .one(&flat_id)
                        .await?;
                    let Some(flat) = flat else {
                        return Ok(Err(AppError::NotFound(format!("Flat {} not found", flat_id))));
                    };
                    if !flat.is_member(&paid_by) {
                        return Ok(Err(AppError::Forbidden(
                            "not a member of this flat".to_string(),
                        )));
                    }

                    let Some(expense) = Expense::split_evenly(
                        expense_id,
                        &new_expense.title,
                        new_expense.amount,
                        new_expense.category,
                        &paid_by,
                        &flat.members,
                        now,
                    ) else {
                        return Ok(Err(AppError::Conflict("flat has no members".to_string())));
                    };

                    let parent = db.parent_path(collections::FLATS, &flat_id)?;
                    db.fluent()
                        .update()
                        .in_col(collections::EXPENSES)
                        .document_id(&expense.id)
                        .parent(&parent)
                        .object(&expense)
                        .add_to_transaction(transaction)?;

                    Ok(Ok(expense))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Create expense transaction failed: {}", e)))??;

        tracing::info!(
            flat_id,
            expense_id = %expense.id,
            paid_by,
            amount = expense.amount,
            amount_per_person = expense.amount_per_person,
            split = expense.split_between.len(),
            "Expense recorded"
        );

        Ok(expense)
    }

    /// Expenses of a flat, newest first, optionally limited to `[start, end)`.
    pub async fn list_expenses(
        &self,
        flat_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Expense>, AppError> {
        let parent = self.flat_path(flat_id)?;
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EXPENSES)
            .parent(&parent);

        let query = if let Some((start, end)) = range {
            let start = format_utc_rfc3339(start);
            let end = format_utc_rfc3339(end);
            query.filter(move |q| {
                q.for_all([
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than(end.clone()),
                ])
            })
        } else {
            query
        };

        query
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Expenses in `[start, end)` that `user_id` is split into.
    pub async fn list_expenses_for_member(
        &self,
        flat_id: &str,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Expense>, AppError> {
        let parent = self.flat_path(flat_id)?;
        let start = format_utc_rfc3339(start);
        let end = format_utc_rfc3339(end);
        let user_id = user_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXPENSES)
            .parent(&parent)
            .filter(move |q| {
                q.for_all([
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than(end.clone()),
                    q.field("split_between").array_contains(user_id.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(db_error)
    }
}
