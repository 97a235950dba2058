//! FinTrack Core
//!
//! Platform-agnostic domain types, error handling and the pure client-side
//! computations for the FinTrack personal finance client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Category`, `Transaction`, `Budget`, the API
//!   envelope, forms and statistics records
//! - **Analytics**: dashboard summaries computed over fetched transactions
//! - **Budget progress**: spent-vs-allocated ratio and status band
//! - **Filters and validation**: client-side filtering and form checks
//! - **Error Handling**: `CoreError` and `Result`
//!
//! Nothing in this crate performs I/O; the HTTP side lives in
//! `fintrack-client`.
//!
//! # Example
//!
//! ```rust
//! use fintrack_core::budget::{calculate_budget_progress, BudgetStatus};
//!
//! let progress = calculate_budget_progress(100.0, 80.0);
//! assert_eq!(progress.status, BudgetStatus::Warning);
//! assert_eq!(progress.percentage, 80.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod budget;
pub mod error;
pub mod filters;
pub mod format;
pub mod types;
pub mod validation;

pub use error::{CoreError, Result};

pub use types::{
    ApiEnvelope, AuthResponse, Budget, BudgetAnalysis, BudgetForm, BudgetId, BudgetPeriod,
    BudgetUpdate, BudgetsSummary, Category, CategoryForm, CategoryId, CategoryStats,
    CategoryUpdate, LoginForm, MonthlyTrend, ProfileUpdate, RegisterForm, Transaction,
    TransactionFilters, TransactionForm, TransactionId, TransactionStats, TransactionType,
    TransactionUpdate, User, UserId,
};
