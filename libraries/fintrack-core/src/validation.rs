//! Form validation and client-side rules applied before any request.

use crate::error::{CoreError, Result};
use crate::types::{BudgetForm, CategoryForm, LoginForm, RegisterForm, TransactionForm};

/// Fewest categories a user may be left with
pub const MIN_CATEGORIES: usize = 3;

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(CoreError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_positive(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CoreError::NonPositiveAmount)
    }
}

/// Non-empty description and category, positive amount
pub fn validate_transaction(form: &TransactionForm) -> Result<()> {
    require(&form.description, "description")?;
    require(form.category_id.as_str(), "category_id")?;
    require_positive(form.amount)
}

/// Non-empty name
pub fn validate_category(form: &CategoryForm) -> Result<()> {
    require(&form.name, "name")
}

/// Non-empty category, positive amount, end not before start
pub fn validate_budget(form: &BudgetForm) -> Result<()> {
    require(form.category_id.as_str(), "category_id")?;
    require_positive(form.amount)?;
    match form.end_date {
        Some(end) if end < form.start_date => Err(CoreError::InvalidDateRange),
        _ => Ok(()),
    }
}

/// Non-empty email and password
pub fn validate_login(form: &LoginForm) -> Result<()> {
    require(&form.email, "email")?;
    require(&form.password, "password")
}

/// Every registration field is required
pub fn validate_registration(form: &RegisterForm) -> Result<()> {
    require(&form.email, "email")?;
    require(&form.password, "password")?;
    require(&form.username, "username")?;
    require(&form.display_name, "display_name")
}

/// Reject deleting a category when only the minimum remain.
///
/// `remaining` is the number of categories before the deletion.
pub fn ensure_category_deletable(remaining: usize) -> Result<()> {
    if remaining <= MIN_CATEGORIES {
        Err(CoreError::TooFewCategories {
            minimum: MIN_CATEGORIES,
        })
    } else {
        Ok(())
    }
}
