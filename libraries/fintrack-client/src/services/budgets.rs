//! Budget endpoints.

use super::{unwrap_data, unwrap_unit};
use crate::error::Result;
use crate::transport::ApiClient;
use chrono::NaiveDate;
use fintrack_core::budget;
use fintrack_core::validation::validate_budget;
use fintrack_core::{
    ApiEnvelope, Budget, BudgetAnalysis, BudgetForm, BudgetId, BudgetPeriod, BudgetUpdate,
    BudgetsSummary, CategoryId,
};

/// Calls against `/api/budgets`
#[derive(Clone)]
pub struct BudgetService {
    api: ApiClient,
}

impl BudgetService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Budget>> {
        let envelope: ApiEnvelope<Vec<Budget>> = self.api.get("/api/budgets").await?;
        unwrap_data(envelope, "Error al obtener presupuestos")
    }

    pub async fn get(&self, id: &BudgetId) -> Result<Budget> {
        let envelope: ApiEnvelope<Budget> = self.api.get(&format!("/api/budgets/{id}")).await?;
        unwrap_data(envelope, "Error al obtener presupuesto")
    }

    pub async fn create(&self, form: &BudgetForm) -> Result<Budget> {
        validate_budget(form)?;
        let envelope: ApiEnvelope<Budget> = self.api.post("/api/budgets", form).await?;
        unwrap_data(envelope, "Error al crear presupuesto")
    }

    pub async fn update(&self, id: &BudgetId, update: &BudgetUpdate) -> Result<Budget> {
        let envelope: ApiEnvelope<Budget> =
            self.api.put(&format!("/api/budgets/{id}"), update).await?;
        unwrap_data(envelope, "Error al actualizar presupuesto")
    }

    pub async fn delete(&self, id: &BudgetId) -> Result<()> {
        let envelope: ApiEnvelope<serde_json::Value> =
            self.api.delete(&format!("/api/budgets/{id}")).await?;
        unwrap_unit(envelope, "Error al eliminar presupuesto")
    }

    pub async fn active(&self) -> Result<Vec<Budget>> {
        let envelope: ApiEnvelope<Vec<Budget>> = self.api.get("/api/budgets/active").await?;
        unwrap_data(envelope, "Error al obtener presupuestos activos")
    }

    pub async fn analysis(&self, id: &BudgetId) -> Result<BudgetAnalysis> {
        let envelope: ApiEnvelope<BudgetAnalysis> = self
            .api
            .get(&format!("/api/budgets/{id}/analysis"))
            .await?;
        unwrap_data(envelope, "Error al obtener análisis de presupuesto")
    }

    pub async fn summary(&self) -> Result<BudgetsSummary> {
        let envelope: ApiEnvelope<BudgetsSummary> = self.api.get("/api/budgets/summary").await?;
        unwrap_data(envelope, "Error al obtener resumen de presupuestos")
    }

    pub async fn by_period(&self, period: BudgetPeriod) -> Result<Vec<Budget>> {
        Ok(budget::budgets_by_period(&self.list().await?, period))
    }

    pub async fn by_category(&self, category_id: &CategoryId) -> Result<Vec<Budget>> {
        Ok(budget::budgets_by_category(&self.list().await?, category_id))
    }

    /// Whether a budget for the category and period covers `today`
    pub async fn has_budget_for_category(
        &self,
        category_id: &CategoryId,
        period: BudgetPeriod,
        today: NaiveDate,
    ) -> Result<bool> {
        Ok(budget::has_budget_for_category(
            &self.list().await?,
            category_id,
            period,
            today,
        ))
    }
}
