//! Budget progress and client-side budget queries.
//!
//! Everything here works on budgets that were already fetched; nothing calls
//! the backend.

use crate::types::{Budget, BudgetPeriod, CategoryId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage at which a budget turns from `Good` to `Warning`
pub const WARNING_THRESHOLD: f64 = 80.0;

/// Percentage at which a budget turns `Danger`
pub const DANGER_THRESHOLD: f64 = 100.0;

/// Status band derived from the spent-vs-allocated ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Below 80% spent
    Good,
    /// 80% up to (not including) 100%
    Warning,
    /// 100% or more
    Danger,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Warning => write!(f, "warning"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// Result of [`calculate_budget_progress`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    /// Spent share of the allocation, clamped to 100
    pub percentage: f64,
    /// Allocation minus spent; negative when over budget
    pub remaining: f64,
    /// Spent strictly exceeds the allocation
    pub is_over_budget: bool,
    /// Status band, computed from the unclamped percentage
    pub status: BudgetStatus,
}

/// Compute progress of a budget of `amount` given `spent` so far.
///
/// A zero (or negative) allocation has no meaningful ratio: any spending
/// reports 100% / danger, no spending reports 0% / good.
pub fn calculate_budget_progress(amount: f64, spent: f64) -> BudgetProgress {
    let raw_percentage = if amount > 0.0 {
        (spent / amount) * 100.0
    } else if spent > 0.0 {
        DANGER_THRESHOLD
    } else {
        0.0
    };

    let status = if raw_percentage >= DANGER_THRESHOLD {
        BudgetStatus::Danger
    } else if raw_percentage >= WARNING_THRESHOLD {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Good
    };

    BudgetProgress {
        percentage: raw_percentage.min(DANGER_THRESHOLD),
        remaining: amount - spent,
        is_over_budget: spent > amount,
        status,
    }
}

/// Progress of a fetched budget
pub fn budget_progress(budget: &Budget, spent: f64) -> BudgetProgress {
    calculate_budget_progress(budget.amount, spent)
}

/// Whole days from `today` until the budget period ends, never negative.
///
/// Open-ended budgets end one period after their start date.
pub fn days_remaining_in_period(budget: &Budget, today: NaiveDate) -> i64 {
    let end = match budget.end_date {
        Some(end) => Some(end),
        None => budget.period.end_from(budget.start_date),
    };

    end.map(|end| (end - today).num_days().max(0)).unwrap_or(0)
}

/// Budgets with the given period
pub fn budgets_by_period(budgets: &[Budget], period: BudgetPeriod) -> Vec<Budget> {
    budgets
        .iter()
        .filter(|b| b.period == period)
        .cloned()
        .collect()
}

/// Budgets for the given category
pub fn budgets_by_category(budgets: &[Budget], category_id: &CategoryId) -> Vec<Budget> {
    budgets
        .iter()
        .filter(|b| &b.category_id == category_id)
        .cloned()
        .collect()
}

/// Whether a budget for `category_id` and `period` is active on `today`
pub fn has_budget_for_category(
    budgets: &[Budget],
    category_id: &CategoryId,
    period: BudgetPeriod,
    today: NaiveDate,
) -> bool {
    budgets
        .iter()
        .any(|b| &b.category_id == category_id && b.period == period && b.is_active_on(today))
}
