// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly expense periods and per-member totals.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::expense::share_total;
use crate::services::MemberContext;
use crate::time_utils::{month_and_year, month_bounds};
use chrono::{DateTime, Utc};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 9999;

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    /// 1-12
    pub month: u32,
    pub year: i32,
}

impl MonthPeriod {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::BadRequest(
                "month must be between 1 and 12".to_string(),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(AppError::BadRequest(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}"
            )));
        }
        Ok(Self { month, year })
    }

    /// The month containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        let (month, year) = month_and_year(now);
        Self { month, year }
    }

    /// Parse optional query parameters; both or neither must be given.
    pub fn from_query(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>> {
        match (month, year) {
            (Some(month), Some(year)) => Self::new(month, year).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::BadRequest(
                "month and year must be given together".to_string(),
            )),
        }
    }

    /// Half-open UTC bounds of the month.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        month_bounds(self.month, self.year).ok_or_else(|| {
            AppError::BadRequest(format!("invalid month {}-{}", self.year, self.month))
        })
    }
}

/// Sum of the caller's shares of the flat's expenses in `period`.
pub async fn monthly_total(
    db: &FirestoreDb,
    ctx: &MemberContext,
    period: MonthPeriod,
) -> Result<f64> {
    let (start, end) = period.bounds()?;
    let expenses = db
        .list_expenses_for_member(&ctx.flat_id, &ctx.user_id, start, end)
        .await?;
    let total = share_total(&expenses, &ctx.user_id);

    tracing::debug!(
        flat_id = %ctx.flat_id,
        user_id = %ctx.user_id,
        month = period.month,
        year = period.year,
        expenses = expenses.len(),
        total,
        "Computed monthly share total"
    );

    Ok(total)
}
