//! Authentication session state machine.
//!
//! ```text
//! Initializing ──initialize──▶ Anonymous | Authenticated
//! Anonymous ──login/signup──▶ Authenticating ──▶ Authenticated | Anonymous
//! Authenticated ──logout──▶ Anonymous
//! Authenticated ──refresh fails──▶ Anonymous
//! ```

use crate::error::Result;
use crate::fallback::SessionBackend;
use crate::navigation::{is_auth_page, routes, Navigator};
use crate::storage::PersistedSession;
use fintrack_core::{LoginForm, ProfileUpdate, RegisterForm, User};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted session not yet checked
    Initializing,
    /// No user
    Anonymous,
    /// Login or signup in flight
    Authenticating,
    /// Signed in
    Authenticated(User),
}

/// Owns the current user and keeps the route consistent with it
pub struct AuthSession {
    state: SessionState,
    backend: Arc<dyn SessionBackend>,
    session: PersistedSession,
    navigator: Arc<dyn Navigator>,
}

impl AuthSession {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        session: PersistedSession,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: SessionState::Initializing,
            backend,
            session,
            navigator,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Still initializing or authenticating
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Initializing | SessionState::Authenticating
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Restore the persisted session, verifying the token with the backend.
    ///
    /// A failed verification clears the persisted session. The route guard
    /// runs afterwards.
    pub async fn initialize(&mut self) -> &SessionState {
        self.state = if self.session.is_authenticated().await {
            match self.backend.verify_token().await {
                Ok(user) => {
                    debug!(user = %user.id, "Session restored");
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    warn!(error = %e, "Stored session is no longer valid");
                    if let Err(e) = self.session.clear().await {
                        warn!(error = %e, "Failed to clear persisted session");
                    }
                    SessionState::Anonymous
                }
            }
        } else {
            SessionState::Anonymous
        };

        self.guard();
        &self.state
    }

    /// Log in and go to the dashboard. On failure the previous state is
    /// restored and the error returned.
    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, SessionState::Authenticating);
        match self.backend.login(form).await {
            Ok(response) => {
                info!(user = %response.user.id, backend = self.backend.name(), "Signed in");
                self.state = SessionState::Authenticated(response.user);
                self.navigator.navigate(routes::DASHBOARD);
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    /// Register and go to the dashboard
    pub async fn signup(&mut self, form: &RegisterForm) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, SessionState::Authenticating);
        match self.backend.register(form).await {
            Ok(response) => {
                info!(user = %response.user.id, backend = self.backend.name(), "Signed up");
                self.state = SessionState::Authenticated(response.user);
                self.navigator.navigate(routes::DASHBOARD);
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    /// Sign out and go to the login page.
    ///
    /// Local state is cleared even when the server call fails.
    pub async fn logout(&mut self) {
        if let Err(e) = self.backend.logout().await {
            warn!(error = %e, "Logout request failed");
        }
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.state = SessionState::Anonymous;
        self.navigator.navigate(routes::LOGIN);
        info!("Signed out");
    }

    /// Re-fetch the profile; any failure signs the user out
    pub async fn refresh_user(&mut self) {
        match self.backend.profile().await {
            Ok(user) => self.state = SessionState::Authenticated(user),
            Err(e) => {
                warn!(error = %e, "Failed to refresh user");
                self.logout().await;
            }
        }
    }

    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User> {
        let user = self.backend.update_profile(update).await?;
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Keep the route consistent with the session.
    ///
    /// Anonymous users are sent to login from any non-auth page, signed-in
    /// users are sent to the dashboard from login or signup. Returns the
    /// redirect target, if one was issued. Does nothing while loading.
    pub fn guard(&self) -> Option<&'static str> {
        if self.is_loading() {
            return None;
        }

        let on_auth_page = is_auth_page(&self.navigator.current_path());
        let target = match (self.is_authenticated(), on_auth_page) {
            (false, false) => routes::LOGIN,
            (true, true) => routes::DASHBOARD,
            _ => return None,
        };

        self.navigator.navigate(target);
        Some(target)
    }
}
