/// Budget domain types
use super::category::Category;
use super::dates;
use super::ids::{BudgetId, CategoryId, UserId};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurrence unit over which a budget amount applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Amount applies per calendar month
    Monthly,
    /// Amount applies per year
    Yearly,
}

impl BudgetPeriod {
    /// Wire name of the period
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// End of one period starting at `start`, or `None` past the calendar range
    pub fn end_from(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Monthly => start.checked_add_months(Months::new(1)),
            Self::Yearly => start.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown budget period: {other}")),
        }
    }
}

/// Spending limit for a category over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique budget identifier
    pub id: BudgetId,
    /// Owning user
    #[serde(default)]
    pub user_id: UserId,
    /// Category the limit applies to
    pub category_id: CategoryId,
    /// Allocated amount per period
    #[serde(deserialize_with = "dates::deserialize_amount")]
    pub amount: f64,
    /// Recurrence unit
    pub period: BudgetPeriod,
    /// First day the budget applies
    #[serde(deserialize_with = "dates::deserialize")]
    pub start_date: NaiveDate,
    /// Last day the budget applies; open-ended when absent
    #[serde(
        default,
        deserialize_with = "dates::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    /// Creation timestamp (ISO string)
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp (ISO string)
    #[serde(default)]
    pub updated_at: String,
    /// Embedded category when the backend joins it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Budget {
    /// Whether the budget covers `day`
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        let before_end = match self.end_date {
            Some(end) => end >= day,
            None => true,
        };
        self.start_date <= day && before_end
    }
}

/// Request body for creating a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetForm {
    /// Category the limit applies to
    pub category_id: CategoryId,
    /// Allocated amount per period
    pub amount: f64,
    /// Recurrence unit
    pub period: BudgetPeriod,
    /// First day the budget applies
    pub start_date: NaiveDate,
    /// Last day the budget applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Partial update of a budget; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    /// New category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// New amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// New period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BudgetPeriod>,
    /// New start date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// New end date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
