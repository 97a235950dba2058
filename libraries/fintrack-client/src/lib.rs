//! FinTrack Client
//!
//! Client library for the FinTrack personal finance API.
//!
//! # Features
//!
//! - **Transport**: JSON over HTTP with bearer auth and forced re-login on 401
//! - **Services**: auth, transactions, categories and budgets with envelope
//!   unwrapping
//! - **Session**: explicit auth state machine with a route guard
//! - **Development fallback**: mock auth backend selected at startup
//! - **Resources**: per-resource `{items, loading, error}` containers
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fintrack_client::{
//!     select_backend, ApiClient, AuthSession, ClientConfig, MemorySessionStore,
//!     PersistedSession, RouteHistory, TransactionService, TransactionsStore,
//! };
//! use fintrack_core::LoginForm;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load()?;
//!     let session = PersistedSession::new(Arc::new(MemorySessionStore::new()));
//!     let navigator = Arc::new(RouteHistory::new("/login"));
//!     let api = ApiClient::new(&config, session.clone(), navigator.clone())?;
//!
//!     let backend = select_backend(&config, &api, session.clone()).await;
//!     let mut auth = AuthSession::new(backend, session, navigator);
//!     auth.login(&LoginForm::new("test@test.com", "test123")).await?;
//!
//!     let mut transactions = TransactionsStore::new(TransactionService::new(api));
//!     transactions.fetch().await;
//!     println!("{} transactions", transactions.items().len());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod fallback;
mod navigation;
mod resources;
mod services;
mod session;
mod storage;
mod transport;

pub use config::{ClientConfig, Environment, FallbackSettings};
pub use error::{handle_api_error, ClientError, Result};
pub use fallback::{
    select_backend, FallbackBackend, MockBackend, RemoteBackend, SessionBackend,
    MOCK_EMAIL, MOCK_PASSWORD,
};
pub use navigation::{is_auth_page, routes, Navigator, RouteHistory};
pub use resources::{
    load_active_budgets, load_budget, load_budget_analysis, load_category,
    load_recent_transactions, load_transaction, load_transaction_stats, search_categories,
    BudgetsStore, CategoriesStore, Insertion, Loadable, ResourceApi, ResourceCollection,
    TransactionsStore,
};
pub use services::{
    AuthService, BudgetService, CategoryService, TransactionService, DEFAULT_RECENT_LIMIT,
};
pub use session::{AuthSession, SessionState};
pub use storage::{
    FileSessionStore, MemorySessionStore, PersistedSession, SessionStore, AUTH_TOKEN_KEY,
    DEV_FALLBACK_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};
pub use transport::ApiClient;
