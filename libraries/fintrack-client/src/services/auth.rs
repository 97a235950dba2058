//! Authentication endpoints.

use super::{unwrap_data, unwrap_unit};
use crate::error::Result;
use crate::storage::PersistedSession;
use crate::transport::ApiClient;
use fintrack_core::validation::{validate_login, validate_registration};
use fintrack_core::{ApiEnvelope, AuthResponse, LoginForm, ProfileUpdate, RegisterForm, User};
use tracing::{info, warn};

/// Auth calls against `/api/auth/*`.
///
/// Successful login and registration persist the tokens and the user.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &PersistedSession {
        self.api.session()
    }

    async fn persist(&self, response: &AuthResponse) -> Result<()> {
        self.session()
            .save_tokens(&response.access_token, &response.refresh_token)
            .await?;
        self.session().save_user(&response.user).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        validate_registration(form)?;
        let envelope: ApiEnvelope<AuthResponse> =
            self.api.post("/api/auth/register", form).await?;
        let response = unwrap_data(envelope, "Error al registrar usuario")?;
        self.persist(&response).await?;
        info!(user = %response.user.id, "Registered");
        Ok(response)
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        validate_login(form)?;
        let envelope: ApiEnvelope<AuthResponse> = self.api.post("/api/auth/login", form).await?;
        let response = unwrap_data(envelope, "Error al iniciar sesión")?;
        self.persist(&response).await?;
        info!(user = %response.user.id, "Logged in");
        Ok(response)
    }

    /// Notify the server, then clear the local session whatever the outcome.
    pub async fn logout(&self) -> Result<()> {
        let result = match self
            .api
            .post_empty::<ApiEnvelope<serde_json::Value>>("/api/auth/logout")
            .await
        {
            Ok(envelope) => unwrap_unit(envelope, "Error al cerrar sesión"),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!(error = %e, "Server logout failed");
        }
        self.session().clear().await?;
        result
    }

    pub async fn profile(&self) -> Result<User> {
        let envelope: ApiEnvelope<User> = self.api.get("/api/auth/profile").await?;
        unwrap_data(envelope, "Error al obtener perfil")
    }

    /// Update the profile and refresh the cached user
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let envelope: ApiEnvelope<User> = self.api.put("/api/auth/profile", update).await?;
        let user = unwrap_data(envelope, "Error al actualizar perfil")?;
        self.session().save_user(&user).await?;
        Ok(user)
    }

    pub async fn verify_token(&self) -> Result<User> {
        let envelope: ApiEnvelope<User> = self.api.get("/api/auth/verify").await?;
        unwrap_data(envelope, "Token inválido")
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session().current_user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.session().access_token().await
    }
}
