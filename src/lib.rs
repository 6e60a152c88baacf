// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ShareNest: shared flats with chore rotation and expense splitting
//!
//! This crate provides the backend API for creating and joining flats,
//! rotating recurring chores among roommates, and splitting shared expenses.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CodeGenerator, RotationService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub codes: CodeGenerator,
    pub rotation_service: RotationService,
}

impl AppState {
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        Self {
            config,
            rotation_service: RotationService::new(db.clone()),
            db,
            codes: CodeGenerator::new(),
        }
    }
}
