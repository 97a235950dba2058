//! Transaction endpoints.

use super::{unwrap_data, unwrap_unit};
use crate::error::Result;
use crate::transport::ApiClient;
use chrono::NaiveDate;
use fintrack_core::validation::validate_transaction;
use fintrack_core::{
    ApiEnvelope, CategoryId, CategoryStats, MonthlyTrend, Transaction, TransactionFilters,
    TransactionForm, TransactionId, TransactionStats, TransactionType, TransactionUpdate,
};
use serde::Serialize;
use tracing::warn;

/// Default size of the recent-transactions list
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Serialize)]
struct PeriodQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<&'a str>,
}

#[derive(Serialize)]
struct MonthsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    months: Option<u32>,
}

/// Calls against `/api/transactions`
#[derive(Clone)]
pub struct TransactionService {
    api: ApiClient,
}

impl TransactionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Rows that fail to decode (no usable date, bad amount) are skipped.
    pub async fn list(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>> {
        let envelope: ApiEnvelope<Vec<serde_json::Value>> =
            self.api.get_with_query("/api/transactions", filters).await?;
        let rows = unwrap_data(envelope, "Error al obtener transacciones")?;
        Ok(decode_rows(rows))
    }

    pub async fn get(&self, id: &TransactionId) -> Result<Transaction> {
        let envelope: ApiEnvelope<Transaction> =
            self.api.get(&format!("/api/transactions/{id}")).await?;
        unwrap_data(envelope, "Error al obtener transacción")
    }

    pub async fn create(&self, form: &TransactionForm) -> Result<Transaction> {
        validate_transaction(form)?;
        let envelope: ApiEnvelope<Transaction> = self.api.post("/api/transactions", form).await?;
        unwrap_data(envelope, "Error al crear transacción")
    }

    pub async fn update(&self, id: &TransactionId, update: &TransactionUpdate) -> Result<Transaction> {
        let envelope: ApiEnvelope<Transaction> = self
            .api
            .put(&format!("/api/transactions/{id}"), update)
            .await?;
        unwrap_data(envelope, "Error al actualizar transacción")
    }

    pub async fn delete(&self, id: &TransactionId) -> Result<()> {
        let envelope: ApiEnvelope<serde_json::Value> =
            self.api.delete(&format!("/api/transactions/{id}")).await?;
        unwrap_unit(envelope, "Error al eliminar transacción")
    }

    /// Server-side aggregates, optionally for a named period (`month`, `year`, ...)
    pub async fn stats(&self, period: Option<&str>) -> Result<TransactionStats> {
        let envelope: ApiEnvelope<TransactionStats> = self
            .api
            .get_with_query("/api/transactions/stats", &PeriodQuery { period })
            .await?;
        unwrap_data(envelope, "Error al obtener estadísticas")
    }

    /// Monthly income/expense trend; `months` of 0 or `None` uses the server default
    pub async fn monthly_trends(&self, months: Option<u32>) -> Result<Vec<MonthlyTrend>> {
        let query = MonthsQuery {
            months: months.filter(|m| *m > 0),
        };
        let envelope: ApiEnvelope<Vec<MonthlyTrend>> = self
            .api
            .get_with_query("/api/transactions/trends", &query)
            .await?;
        unwrap_data(envelope, "Error al obtener tendencias")
    }

    pub async fn category_stats(&self, period: Option<&str>) -> Result<Vec<CategoryStats>> {
        let envelope: ApiEnvelope<Vec<CategoryStats>> = self
            .api
            .get_with_query("/api/transactions/category-stats", &PeriodQuery { period })
            .await?;
        unwrap_data(envelope, "Error al obtener estadísticas por categoría")
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<Transaction>> {
        self.list(&TransactionFilters::recent(limit)).await
    }

    pub async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
        self.list(&TransactionFilters::date_range(start, end)).await
    }

    pub async fn by_type(&self, kind: TransactionType) -> Result<Vec<Transaction>> {
        self.list(&TransactionFilters::of_type(kind)).await
    }

    pub async fn by_category(&self, category_id: &CategoryId) -> Result<Vec<Transaction>> {
        self.list(&TransactionFilters::in_category(category_id.clone()))
            .await
    }
}

fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<Transaction> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<Transaction>(row) {
            Ok(transaction) => Some(transaction),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable transaction");
                None
            }
        })
        .collect()
}
