//! Client-side filtering over fetched collections.

use crate::types::{Category, Transaction, TransactionFilters};

/// Name keywords that mark a category as an income category
pub const INCOME_KEYWORDS: &[&str] = &["salario", "ingreso", "bonus", "comision", "freelance", "renta"];

/// Name keywords that mark a category as an expense category
pub const EXPENSE_KEYWORDS: &[&str] = &["comida", "transporte", "entretenimiento", "casa", "salud", "compras"];

impl TransactionFilters {
    /// Whether a single transaction passes every set filter (limit excluded)
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if t.kind != kind {
                return false;
            }
        }
        if let Some(category_id) = &self.category_id {
            if &t.category_id != category_id {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if t.transaction_date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if t.transaction_date > end {
                return false;
            }
        }
        true
    }

    /// Apply the filters to an already-fetched collection.
    ///
    /// Results are newest first; `limit` keeps the first N after sorting.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Sort by transaction date, newest first. Stable for equal dates.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
}

/// Case-insensitive substring search on category names
pub fn search_categories(categories: &[Category], query: &str) -> Vec<Category> {
    let needle = query.trim().to_lowercase();
    categories
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

fn matching_keywords(categories: &[Category], keywords: &[&str]) -> Vec<Category> {
    categories
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
        .cloned()
        .collect()
}

/// Categories whose names look like income sources
pub fn income_categories(categories: &[Category]) -> Vec<Category> {
    matching_keywords(categories, INCOME_KEYWORDS)
}

/// Categories whose names look like spending
pub fn expense_categories(categories: &[Category]) -> Vec<Category> {
    matching_keywords(categories, EXPENSE_KEYWORDS)
}
