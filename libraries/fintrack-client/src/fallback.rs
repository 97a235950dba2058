//! Auth backends and the development fallback.
//!
//! [`select_backend`] picks the backend once at startup. Production always
//! gets [`RemoteBackend`]; development may get the mock, either because the
//! fallback flag is set or, with auto fallback on, the moment the API is
//! unreachable or failing.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::services::AuthService;
use crate::storage::PersistedSession;
use crate::transport::ApiClient;
use async_trait::async_trait;
use chrono::Utc;
use fintrack_core::validation::{validate_login, validate_registration};
use fintrack_core::{AuthResponse, LoginForm, ProfileUpdate, RegisterForm, User, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Email accepted by the mock backend
pub const MOCK_EMAIL: &str = "test@test.com";
/// Password accepted by the mock backend
pub const MOCK_PASSWORD: &str = "test123";

/// Source of authentication results for [`AuthSession`](crate::AuthSession)
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn login(&self, form: &LoginForm) -> Result<AuthResponse>;
    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse>;
    async fn verify_token(&self) -> Result<User>;
    async fn profile(&self) -> Result<User>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User>;
    async fn logout(&self) -> Result<()>;
}

/// The real API
#[derive(Clone)]
pub struct RemoteBackend {
    auth: AuthService,
}

impl RemoteBackend {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthService::new(api),
        }
    }
}

#[async_trait]
impl SessionBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        self.auth.login(form).await
    }

    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        self.auth.register(form).await
    }

    async fn verify_token(&self) -> Result<User> {
        self.auth.verify_token().await
    }

    async fn profile(&self) -> Result<User> {
        self.auth.profile().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.auth.update_profile(update).await
    }

    async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }
}

/// Canned development backend that never touches the network.
///
/// Accepts only [`MOCK_EMAIL`] / [`MOCK_PASSWORD`]; registration accepts any
/// valid form. Results are persisted like real ones.
#[derive(Clone)]
pub struct MockBackend {
    session: PersistedSession,
    latency: Duration,
}

impl MockBackend {
    pub fn new(session: PersistedSession, latency: Duration) -> Self {
        Self { session, latency }
    }

    /// The account every mock login resolves to
    pub fn mock_user() -> User {
        let now = Utc::now().to_rfc3339();
        User {
            id: UserId::new("mock-user"),
            auth_id: "mock-auth-id".to_string(),
            email: MOCK_EMAIL.to_string(),
            username: "testuser".to_string(),
            display_name: "Usuario de Prueba".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn tokens_for(user: User) -> AuthResponse {
        let stamp = Utc::now().timestamp_millis();
        AuthResponse {
            user,
            access_token: format!("mock-jwt-token-{stamp}"),
            refresh_token: format!("mock-refresh-token-{stamp}"),
        }
    }

    async fn simulate_latency(&self, divisor: u32) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency / divisor).await;
        }
    }

    async fn persist(&self, response: &AuthResponse) -> Result<()> {
        self.session
            .save_tokens(&response.access_token, &response.refresh_token)
            .await?;
        self.session.save_user(&response.user).await
    }
}

#[async_trait]
impl SessionBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        self.simulate_latency(1).await;

        if form.email != MOCK_EMAIL || form.password != MOCK_PASSWORD {
            return Err(ClientError::InvalidCredentials(format!(
                "Credenciales incorrectas (usa {MOCK_EMAIL} / {MOCK_PASSWORD})"
            )));
        }

        let response = Self::tokens_for(Self::mock_user());
        self.persist(&response).await?;
        Ok(response)
    }

    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        validate_registration(form)?;
        self.simulate_latency(1).await;

        let stamp = Utc::now().timestamp_millis();
        let now = Utc::now().to_rfc3339();
        let user = User {
            id: UserId::new(format!("mock-user-{stamp}")),
            auth_id: format!("mock-auth-{stamp}"),
            email: form.email.clone(),
            username: form.username.clone(),
            display_name: form.display_name.clone(),
            created_at: now.clone(),
            updated_at: now,
        };

        let response = Self::tokens_for(user);
        self.persist(&response).await?;
        Ok(response)
    }

    async fn verify_token(&self) -> Result<User> {
        self.simulate_latency(2).await;
        Ok(Self::mock_user())
    }

    async fn profile(&self) -> Result<User> {
        Ok(self
            .session
            .current_user()
            .await
            .unwrap_or_else(Self::mock_user))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let mut user = self.profile().await?;
        if let Some(email) = &update.email {
            user.email.clone_from(email);
        }
        if let Some(username) = &update.username {
            user.username.clone_from(username);
        }
        if let Some(display_name) = &update.display_name {
            user.display_name.clone_from(display_name);
        }
        user.updated_at = Utc::now().to_rfc3339();
        self.session.save_user(&user).await?;
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        self.session.clear().await
    }
}

/// Remote backend that switches to the mock when the API fails.
///
/// Token verification switches on connectivity or server errors. Login also
/// switches on a 401 and registration on any error status.
///
/// Once switched, the persisted fallback flag keeps later calls (and later
/// runs) on the mock until it is disabled.
#[derive(Clone)]
pub struct FallbackBackend {
    remote: RemoteBackend,
    mock: MockBackend,
    session: PersistedSession,
}

impl FallbackBackend {
    pub fn new(remote: RemoteBackend, mock: MockBackend, session: PersistedSession) -> Self {
        Self {
            remote,
            mock,
            session,
        }
    }

    /// No response or a 5xx
    fn is_outage(error: &ClientError) -> bool {
        error.is_connectivity() || error.is_server_error()
    }

    /// Login also treats a rejected login as a reason to use the mock
    fn login_falls_back(error: &ClientError) -> bool {
        Self::is_outage(error) || error.is_unauthorized()
    }

    /// Registration falls back on any HTTP error status
    fn register_falls_back(error: &ClientError) -> bool {
        error.is_connectivity() || error.status().is_some_and(|status| status >= 400)
    }

    async fn switch_to_mock(&self, error: &ClientError) -> Result<()> {
        warn!(
            error = %error,
            "API request failed, switching to development mock (use {MOCK_EMAIL} / {MOCK_PASSWORD})"
        );
        self.session.set_fallback_enabled(true).await
    }

    async fn use_mock(&self) -> bool {
        self.session.fallback_enabled().await
    }
}

#[async_trait]
impl SessionBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        if self.use_mock().await {
            return self.mock.login(form).await;
        }
        validate_login(form)?;
        match self.remote.login(form).await {
            Err(e) if Self::login_falls_back(&e) => {
                self.switch_to_mock(&e).await?;
                self.mock.login(form).await
            }
            other => other,
        }
    }

    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse> {
        if self.use_mock().await {
            return self.mock.register(form).await;
        }
        match self.remote.register(form).await {
            Err(e) if Self::register_falls_back(&e) => {
                self.switch_to_mock(&e).await?;
                self.mock.register(form).await
            }
            other => other,
        }
    }

    async fn verify_token(&self) -> Result<User> {
        if self.use_mock().await {
            return self.mock.verify_token().await;
        }
        match self.remote.verify_token().await {
            Err(e) if Self::is_outage(&e) => {
                self.switch_to_mock(&e).await?;
                self.mock.verify_token().await
            }
            other => other,
        }
    }

    async fn profile(&self) -> Result<User> {
        if self.use_mock().await {
            self.mock.profile().await
        } else {
            self.remote.profile().await
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        if self.use_mock().await {
            self.mock.update_profile(update).await
        } else {
            self.remote.update_profile(update).await
        }
    }

    async fn logout(&self) -> Result<()> {
        if self.use_mock().await {
            self.mock.logout().await
        } else {
            self.remote.logout().await
        }
    }
}

/// Choose the auth backend for this run.
///
/// | environment | auto fallback | flag set | backend |
/// |-------------|---------------|----------|---------|
/// | production  | any           | any      | remote  |
/// | development | on            | any      | fallback|
/// | development | off           | yes      | mock    |
/// | development | off           | no       | remote  |
pub async fn select_backend(
    config: &ClientConfig,
    api: &ApiClient,
    session: PersistedSession,
) -> Arc<dyn SessionBackend> {
    let remote = RemoteBackend::new(api.clone());

    if config.is_production() {
        if session.fallback_enabled().await {
            warn!("Ignoring development fallback flag in production");
        }
        return Arc::new(remote);
    }

    let mock = MockBackend::new(
        session.clone(),
        Duration::from_millis(config.fallback.latency_ms),
    );

    let backend: Arc<dyn SessionBackend> = if config.fallback.auto_fallback {
        Arc::new(FallbackBackend::new(remote, mock, session))
    } else if session.fallback_enabled().await {
        Arc::new(mock)
    } else {
        Arc::new(remote)
    };

    info!(backend = backend.name(), "Selected auth backend");
    backend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStore;

    fn mock() -> (MockBackend, PersistedSession) {
        let session = PersistedSession::new(Arc::new(MemorySessionStore::new()));
        (MockBackend::new(session.clone(), Duration::ZERO), session)
    }

    #[tokio::test]
    async fn mock_login_accepts_fixed_credentials() {
        let (backend, session) = mock();
        let response = backend
            .login(&LoginForm::new(MOCK_EMAIL, MOCK_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.user.id, UserId::new("mock-user"));
        assert_eq!(response.user.display_name, "Usuario de Prueba");
        assert!(response.access_token.starts_with("mock-jwt-token-"));
        assert!(response.refresh_token.starts_with("mock-refresh-token-"));
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn mock_login_rejects_anything_else() {
        let (backend, session) = mock();
        let err = backend
            .login(&LoginForm::new(MOCK_EMAIL, "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidCredentials(_)));
        assert_eq!(
            err.to_string(),
            "Credenciales incorrectas (usa test@test.com / test123)"
        );
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn mock_register_uses_form_fields() {
        let (backend, _) = mock();
        let form = RegisterForm {
            email: "ana@example.com".into(),
            password: "secret".into(),
            username: "ana".into(),
            display_name: "Ana".into(),
        };
        let response = backend.register(&form).await.unwrap();

        assert!(response.user.id.as_str().starts_with("mock-user-"));
        assert_eq!(response.user.email, "ana@example.com");
        assert_eq!(response.user.display_name, "Ana");
    }

    #[tokio::test]
    async fn mock_profile_update_is_persisted() {
        let (backend, session) = mock();
        backend
            .login(&LoginForm::new(MOCK_EMAIL, MOCK_PASSWORD))
            .await
            .unwrap();

        let user = backend
            .update_profile(&ProfileUpdate {
                display_name: Some("Tester".into()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(user.display_name, "Tester");
        assert_eq!(session.current_user().await.unwrap().display_name, "Tester");
    }
}
