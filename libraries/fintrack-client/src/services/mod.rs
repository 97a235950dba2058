//! Domain services over the API envelope.
//!
//! Each call unwraps `{success, data, message}`: success with data yields
//! the data, anything else fails with the server message or a fixed
//! fallback message for that operation.

mod auth;
mod budgets;
mod categories;
mod transactions;

pub use auth::AuthService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use transactions::{TransactionService, DEFAULT_RECENT_LIMIT};

use crate::error::{ClientError, Result};
use fintrack_core::ApiEnvelope;

pub(crate) fn unwrap_data<T>(envelope: ApiEnvelope<T>, fallback: &str) -> Result<T> {
    envelope.into_data(fallback).map_err(ClientError::Api)
}

pub(crate) fn unwrap_unit<T>(envelope: ApiEnvelope<T>, fallback: &str) -> Result<()> {
    envelope.into_unit(fallback).map_err(ClientError::Api)
}
