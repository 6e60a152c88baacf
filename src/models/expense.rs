//! Shared expense model with equal-split shares.

use crate::time_utils::{month_and_year, utc_seconds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Expense categories offered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Cleaning,
    Paper,
    Food,
    Utilities,
    #[serde(other)]
    Other,
}

/// An expense stored at `flats/{flat_id}/expenses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    /// Total paid
    pub amount: f64,
    pub category: ExpenseCategory,
    /// Member who paid
    pub paid_by: String,
    /// Members sharing the cost, fixed at creation
    pub split_between: Vec<String>,
    /// `amount / split_between.len()`, fixed at creation
    pub amount_per_person: f64,
    #[serde(with = "utc_seconds")]
    pub date: DateTime<Utc>,
    #[serde(with = "utc_seconds")]
    pub created_at: DateTime<Utc>,
    /// Calendar month (1-12) of `date`
    pub month: u32,
    pub year: i32,
}

/// Per-person share of `amount` split evenly among `members` people.
pub fn per_person_share(amount: f64, members: usize) -> Option<f64> {
    if members == 0 {
        None
    } else {
        Some(amount / members as f64)
    }
}

/// Sum of `user_id`'s shares over `expenses`.
///
/// Expenses the user is not split into contribute nothing.
pub fn share_total<'a, I>(expenses: I, user_id: &str) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .filter(|e| e.split_between.iter().any(|m| m == user_id))
        .map(|e| e.amount_per_person)
        .sum()
}

impl Expense {
    /// Build an expense split evenly among `members`.
    ///
    /// Returns `None` when there is nobody to split with.
    pub fn split_evenly(
        id: String,
        title: &str,
        amount: f64,
        category: ExpenseCategory,
        paid_by: &str,
        members: &[String],
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let amount_per_person = per_person_share(amount, members.len())?;
        let (month, year) = month_and_year(now);
        Some(Self {
            id,
            title: title.to_string(),
            amount,
            category,
            paid_by: paid_by.to_string(),
            split_between: members.to_vec(),
            amount_per_person,
            date: now,
            created_at: now,
            month,
            year,
        })
    }
}
