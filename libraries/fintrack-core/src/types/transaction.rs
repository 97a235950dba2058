/// Transaction domain types
use super::category::Category;
use super::dates;
use super::ids::{CategoryId, TransactionId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in; adds to balances
    Income,
    /// Money going out; subtracts from balances
    Expense,
}

impl TransactionType {
    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Apply the aggregation sign of this type to a (positive) amount
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// A recorded income or expense
///
/// Always serialized in the canonical shape. Deserialization also accepts
/// the legacy `date` field in place of `transaction_date`, and takes the
/// category id from an embedded `category` object when `category_id` is
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,
    /// Owning user
    pub user_id: UserId,
    /// Category reference
    pub category_id: CategoryId,
    /// Positive amount; the sign comes from `kind`
    pub amount: f64,
    /// Free-text description
    pub description: String,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Calendar date the transaction happened
    pub transaction_date: NaiveDate,
    /// Creation timestamp (ISO string)
    pub created_at: String,
    /// Last update timestamp (ISO string)
    pub updated_at: String,
    /// Embedded category when the backend joins it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Transaction {
    /// Amount with the aggregation sign applied
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }

    /// True for income transactions
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// True for expense transactions
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// Ingestion shape accepted from the wire
#[derive(Deserialize)]
struct RawTransaction {
    id: TransactionId,
    #[serde(default)]
    user_id: UserId,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(deserialize_with = "dates::deserialize_amount")]
    amount: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(default)]
    transaction_date: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    category: Option<Category>,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = String;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let date_str = raw
            .transaction_date
            .filter(|d| !d.trim().is_empty())
            .or(raw.date.filter(|d| !d.trim().is_empty()))
            .ok_or_else(|| format!("transaction {} has no date", raw.id))?;

        let transaction_date = dates::parse_api_date(&date_str)
            .ok_or_else(|| format!("transaction {} has an invalid date: {date_str}", raw.id))?;

        let category_id = raw
            .category_id
            .filter(|c| !c.is_empty())
            .or_else(|| raw.category.as_ref().map(|c| c.id.clone()))
            .unwrap_or_default();

        Ok(Self {
            id: raw.id,
            user_id: raw.user_id,
            category_id,
            amount: raw.amount,
            description: raw.description.unwrap_or_default(),
            kind: raw.kind,
            transaction_date,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            category: raw.category,
        })
    }
}

/// Request body for creating a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Category reference
    pub category_id: CategoryId,
    /// Positive amount
    pub amount: f64,
    /// Free-text description
    pub description: String,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Calendar date, sent as `YYYY-MM-DD`
    pub transaction_date: NaiveDate,
}

/// Partial update of a transaction; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    /// New category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// New amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    /// New date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,
}

/// Listing filters, sent as query parameters and also applicable locally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilters {
    /// Only this type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    /// Only this category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Maximum number of results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl TransactionFilters {
    /// Only the most recent `limit` transactions
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Inclusive date range
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    /// Only one transaction type
    pub fn of_type(kind: TransactionType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Only one category
    pub fn in_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }
}
