// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod expense;
pub mod flat;
pub mod rotation;
pub mod task;
pub mod user;

pub use expense::{Expense, ExpenseCategory};
pub use flat::{Flat, InviteCodeRecord, MembershipError};
pub use rotation::{Rotation, RotationStep};
pub use task::{CompletionError, Task, TaskCategory, TaskKind, TaskStatus};
pub use user::User;
