//! Dashboard and analytics summaries computed over fetched transactions.
//!
//! Income adds and expense subtracts in every total produced here.

use crate::filters::sort_newest_first;
use crate::types::{Category, CategoryId, Transaction, TransactionType};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Label used when a transaction references an unknown category
pub const UNCATEGORIZED: &str = "Sin categoría";

/// Share of current-month income treated as the implicit monthly budget
pub const IMPLICIT_BUDGET_RATIO: f64 = 0.8;

/// Income, expenses and the resulting balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
}

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyBreakdown {
    /// Income minus expenses
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    /// `YYYY-MM` key
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub name: String,
    pub value: f64,
}

/// Totals over all transactions
pub fn summarize(transactions: &[Transaction]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();
    for t in transactions {
        match t.kind {
            TransactionType::Income => summary.total_income += t.amount,
            TransactionType::Expense => summary.total_expenses += t.amount,
        }
    }
    summary.net_balance = summary.total_income - summary.total_expenses;
    summary
}

/// Newest `limit` transactions
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

/// Per-month income/expense totals, oldest first, keeping the last `months`
pub fn monthly_breakdown(transactions: &[Transaction], months: usize) -> Vec<MonthlyBreakdown> {
    let mut by_month: BTreeMap<(i32, u32), MonthlyBreakdown> = BTreeMap::new();
    for t in transactions {
        let date = t.transaction_date;
        let entry = by_month
            .entry((date.year(), date.month()))
            .or_insert_with(|| MonthlyBreakdown {
                year: date.year(),
                month: date.month(),
                income: 0.0,
                expenses: 0.0,
            });
        match t.kind {
            TransactionType::Income => entry.income += t.amount,
            TransactionType::Expense => entry.expenses += t.amount,
        }
    }

    let all: Vec<MonthlyBreakdown> = by_month.into_values().collect();
    let skip = all.len().saturating_sub(months);
    all.into_iter().skip(skip).collect()
}

/// Expense totals per category name, largest first
pub fn spending_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategorySpending> {
    let names: HashMap<&CategoryId, &str> = categories
        .iter()
        .map(|c| (&c.id, c.name.as_str()))
        .collect();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        let name = names.get(&t.category_id).copied().unwrap_or(UNCATEGORIZED);
        *totals.entry(name).or_insert(0.0) += t.amount;
    }

    let mut out: Vec<CategorySpending> = totals
        .into_iter()
        .map(|(name, value)| CategorySpending {
            name: name.to_string(),
            value,
        })
        .collect();
    out.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Total expenses divided by the number of distinct months with activity
pub fn average_monthly_expense(transactions: &[Transaction]) -> f64 {
    let months: BTreeSet<(i32, u32)> = transactions
        .iter()
        .map(|t| (t.transaction_date.year(), t.transaction_date.month()))
        .collect();
    summarize(transactions).total_expenses / months.len().max(1) as f64
}

/// Current-month expenses as a percentage of 80% of current-month income.
///
/// Rounded and clamped to 100; 0 when there was no income this month.
pub fn current_month_budget_usage(transactions: &[Transaction], today: NaiveDate) -> u32 {
    let in_month = |t: &&Transaction| {
        t.transaction_date.year() == today.year() && t.transaction_date.month() == today.month()
    };
    let month: Vec<Transaction> = transactions.iter().filter(in_month).cloned().collect();
    let summary = summarize(&month);

    let budget = summary.total_income * IMPLICIT_BUDGET_RATIO;
    if budget <= 0.0 {
        return 0;
    }
    let percent = ((summary.total_expenses / budget) * 100.0).round();
    percent.clamp(0.0, 100.0) as u32
}
