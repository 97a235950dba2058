//! Category endpoints.

use super::{unwrap_data, unwrap_unit};
use crate::error::Result;
use crate::transport::ApiClient;
use fintrack_core::filters;
use fintrack_core::validation::validate_category;
use fintrack_core::{ApiEnvelope, Category, CategoryForm, CategoryId, CategoryUpdate};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanDelete {
    can_delete: Option<bool>,
}

/// Calls against `/api/categories`
#[derive(Clone)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let envelope: ApiEnvelope<Vec<Category>> = self.api.get("/api/categories").await?;
        unwrap_data(envelope, "Error al obtener categorías")
    }

    pub async fn get(&self, id: &CategoryId) -> Result<Category> {
        let envelope: ApiEnvelope<Category> =
            self.api.get(&format!("/api/categories/{id}")).await?;
        unwrap_data(envelope, "Error al obtener categoría")
    }

    pub async fn create(&self, form: &CategoryForm) -> Result<Category> {
        validate_category(form)?;
        let envelope: ApiEnvelope<Category> = self.api.post("/api/categories", form).await?;
        unwrap_data(envelope, "Error al crear categoría")
    }

    pub async fn update(&self, id: &CategoryId, update: &CategoryUpdate) -> Result<Category> {
        let envelope: ApiEnvelope<Category> = self
            .api
            .put(&format!("/api/categories/{id}"), update)
            .await?;
        unwrap_data(envelope, "Error al actualizar categoría")
    }

    pub async fn delete(&self, id: &CategoryId) -> Result<()> {
        let envelope: ApiEnvelope<serde_json::Value> =
            self.api.delete(&format!("/api/categories/{id}")).await?;
        unwrap_unit(envelope, "Error al eliminar categoría")
    }

    /// Server's suggested starter categories
    pub async fn defaults(&self) -> Result<Vec<Category>> {
        let envelope: ApiEnvelope<Vec<Category>> =
            self.api.get("/api/categories/defaults").await?;
        unwrap_data(envelope, "Error al obtener categorías por defecto")
    }

    /// Create the starter categories for the current user
    pub async fn create_defaults(&self) -> Result<Vec<Category>> {
        let envelope: ApiEnvelope<Vec<Category>> =
            self.api.post_empty("/api/categories/create-defaults").await?;
        unwrap_data(envelope, "Error al crear categorías por defecto")
    }

    /// Case-insensitive name search over the full list
    pub async fn search(&self, query: &str) -> Result<Vec<Category>> {
        Ok(filters::search_categories(&self.list().await?, query))
    }

    pub async fn income_categories(&self) -> Result<Vec<Category>> {
        Ok(filters::income_categories(&self.list().await?))
    }

    pub async fn expense_categories(&self) -> Result<Vec<Category>> {
        Ok(filters::expense_categories(&self.list().await?))
    }

    /// Ask the server whether the category can be removed.
    ///
    /// Any failure, including a missing endpoint, counts as deletable.
    pub async fn can_delete(&self, id: &CategoryId) -> bool {
        let result: Result<ApiEnvelope<CanDelete>> = self
            .api
            .get(&format!("/api/categories/{id}/can-delete"))
            .await;
        match result {
            Ok(envelope) => envelope
                .data
                .and_then(|d| d.can_delete)
                .unwrap_or(true),
            Err(e) => {
                debug!(category = %id, error = %e, "can-delete probe failed");
                true
            }
        }
    }
}
