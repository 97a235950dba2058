/// Server-computed statistics records
use super::budget::Budget;
use super::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// Aggregates from `/api/transactions/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub transactions_count: u64,
    pub avg_transaction_amount: f64,
}

/// One month from `/api/transactions/trends`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub year: i32,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// One category from `/api/transactions/category-stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category_id: CategoryId,
    pub category_name: String,
    pub total_amount: f64,
    pub transaction_count: u64,
    pub percentage: f64,
}

/// Spent-vs-allocated analysis from `/api/budgets/{id}/analysis`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    #[serde(rename = "daysRemaining", alias = "days_remaining")]
    pub days_remaining: i64,
}

/// Totals across all budgets from `/api/budgets/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetsSummary {
    pub total_budgets: u64,
    pub total_allocated: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub over_budget_count: u64,
}
