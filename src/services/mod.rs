// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod codes;
pub mod expenses;
pub mod membership;
pub mod rotation;

pub use codes::CodeGenerator;
pub use expenses::MonthPeriod;
pub use membership::MemberContext;
pub use rotation::{RotationReport, RotationService};
