// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared expenses of the caller's flat.

use crate::db::NewExpense;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Expense, ExpenseCategory};
use crate::routes::required_text;
use crate::services::expenses::monthly_total;
use crate::services::{MemberContext, MonthPeriod};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Largest single expense accepted.
const MAX_EXPENSE_AMOUNT: f64 = 1_000_000.0;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/flat/expenses", get(list_expenses).post(create_expense))
        .route("/api/flat/expenses/total", get(get_monthly_total))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct ExpenseResponse {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub paid_by: String,
    pub split_between: Vec<String>,
    pub amount_per_person: f64,
    pub date: String,
    pub month: u32,
    pub year: i32,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            paid_by: expense.paid_by,
            split_between: expense.split_between,
            amount_per_person: expense.amount_per_person,
            date: format_utc_rfc3339(expense.date),
            month: expense.month,
            year: expense.year,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct ExpensesResponse {
    pub expenses: Vec<ExpenseResponse>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct MonthlyTotalResponse {
    pub month: u32,
    pub year: i32,
    pub total: f64,
}

#[derive(Deserialize, Validate)]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(range(exclusive_min = 0.0, max = MAX_EXPENSE_AMOUNT))]
    pub amount: f64,
    pub category: ExpenseCategory,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Expenses of the caller's flat, newest first, optionally for one month.
async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ExpensesResponse>> {
    let period = MonthPeriod::from_query(query.month, query.year)?;
    let range = period.map(|p| p.bounds()).transpose()?;

    let ctx = MemberContext::resolve(&state.db, &user).await?;

    let expenses = state
        .db
        .list_expenses(&ctx.flat_id, range)
        .await?
        .into_iter()
        .map(ExpenseResponse::from)
        .collect();

    Ok(Json(ExpensesResponse { expenses }))
}

/// Record an expense paid by the caller, split among current members.
async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>)> {
    body.validate()?;
    if !body.amount.is_finite() {
        return Err(AppError::BadRequest("amount must be finite".to_string()));
    }
    let title = required_text(&body.title, "title")?;

    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let expense_id = state.codes.document_id()?;
    let new_expense = NewExpense {
        title,
        amount: body.amount,
        category: body.category,
    };

    let expense = state
        .db
        .create_expense_atomic(
            &ctx.flat_id,
            &ctx.user_id,
            &new_expense,
            expense_id,
            chrono::Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense.into())))
}

/// The caller's share of the flat's expenses for a month (default: current).
async fn get_monthly_total(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyTotalResponse>> {
    let period = MonthPeriod::from_query(query.month, query.year)?
        .unwrap_or_else(|| MonthPeriod::containing(chrono::Utc::now()));

    let ctx = MemberContext::resolve(&state.db, &user).await?;
    let total = monthly_total(&state.db, &ctx, period).await?;

    Ok(Json(MonthlyTotalResponse {
        month: period.month,
        year: period.year,
        total,
    }))
}
