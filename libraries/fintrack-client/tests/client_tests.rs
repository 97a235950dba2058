//! Integration tests for the FinTrack client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a running API.

use chrono::NaiveDate;
use fintrack_client::{
    handle_api_error, select_backend, ApiClient, BudgetService, CategoriesStore, CategoryService,
    ClientConfig, ClientError, Environment, MemorySessionStore, PersistedSession, RouteHistory,
    SessionBackend, TransactionService, TransactionsStore, AUTH_TOKEN_KEY, DEV_FALLBACK_KEY,
    MOCK_EMAIL, MOCK_PASSWORD, REFRESH_TOKEN_KEY, USER_KEY,
};
use fintrack_core::{
    CategoryId, LoginForm, RegisterForm, TransactionFilters, TransactionForm, TransactionId,
    TransactionType, TransactionUpdate, User, UserId,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    api: ApiClient,
    session: PersistedSession,
    navigator: Arc<RouteHistory>,
}

fn harness(base_url: &str, current_path: &str) -> Harness {
    let session = PersistedSession::new(Arc::new(MemorySessionStore::new()));
    let navigator = Arc::new(RouteHistory::new(current_path));
    let api = ApiClient::with_base_url(
        base_url,
        Duration::from_secs(5),
        session.clone(),
        navigator.clone(),
    )
    .unwrap();
    Harness {
        api,
        session,
        navigator,
    }
}

fn user() -> User {
    User {
        id: UserId::new("u1"),
        auth_id: "auth-u1".into(),
        email: "ana@example.com".into(),
        username: "ana".into(),
        display_name: "Ana".into(),
        created_at: "2024-01-01T00:00:00Z".into(),
        updated_at: "2024-01-01T00:00:00Z".into(),
    }
}

async fn sign_in(session: &PersistedSession) {
    session.save_tokens("token-123", "refresh-456").await.unwrap();
    session.save_user(&user()).await.unwrap();
}

fn transaction_json(id: &str, amount: f64, date: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u1",
        "category_id": "food",
        "amount": amount,
        "description": "Groceries",
        "type": "expense",
        "transaction_date": date,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z"
    })
}

fn category_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "icon": "tag",
        "color": "#10B981",
        "user_id": "u1"
    })
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn expense_form(amount: f64) -> TransactionForm {
    TransactionForm {
        category_id: CategoryId::new("food"),
        amount,
        description: "Groceries".into(),
        kind: TransactionType::Expense,
        transaction_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
    }
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    fn build(url: &str) -> Result<ApiClient, ClientError> {
        let session = PersistedSession::new(Arc::new(MemorySessionStore::new()));
        ApiClient::with_base_url(
            url,
            Duration::from_secs(10),
            session,
            Arc::new(RouteHistory::new("/")),
        )
    }

    #[test]
    fn test_trailing_slash_removed() {
        let client = build("http://localhost:3001/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_empty_url_rejected() {
        match build("") {
            Err(ClientError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_missing_scheme_rejected() {
        assert!(matches!(
            build("localhost:3001"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::default();
        let session = PersistedSession::new(Arc::new(MemorySessionStore::new()));
        let client =
            ApiClient::new(&config, session, Arc::new(RouteHistory::new("/"))).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
    }
}

// =============================================================================
// Transport Tests
// =============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/dashboard");
        sign_in(&h.session).await;

        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .and(header("Authorization", "Bearer token-123"))
            .respond_with(ok(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let categories = CategoryService::new(h.api.clone()).list().await.unwrap();
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_redirects_once() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");
        sign_in(&h.session).await;

        Mock::given(method("GET"))
            .and(path("/api/transactions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })),
            )
            .mount(&server)
            .await;

        let service = TransactionService::new(h.api.clone());
        let err = service
            .list(&TransactionFilters::default())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            assert_eq!(h.session.store().get(key).await.unwrap(), None);
        }
        assert_eq!(h.navigator.navigations(), vec!["/login".to_string()]);

        // Already on /login: no second redirect
        let _ = service.list(&TransactionFilters::default()).await;
        assert_eq!(h.navigator.navigations().len(), 1);
    }

    #[tokio::test]
    async fn test_login_unauthorized_does_not_redirect() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/login");

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Email o contraseña incorrectos"
            })))
            .mount(&server)
            .await;

        let auth = fintrack_client::AuthService::new(h.api.clone());
        let err = auth
            .login(&LoginForm::new("ana@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(h.navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_error_body_message_extracted() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Validation failed",
                "details": [
                    { "field": "amount", "message": "amount is too large" },
                    { "field": "description", "message": "description is too long" }
                ]
            })))
            .mount(&server)
            .await;

        let err = TransactionService::new(h.api.clone())
            .create(&expense_form(10.0))
            .await
            .unwrap_err();

        assert_eq!(
            handle_api_error(&err),
            "amount is too large, description is too long"
        );
    }

    #[tokio::test]
    async fn test_not_found_translation() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("GET"))
            .and(path("/api/transactions/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "message": "Transaction not found"
            })))
            .mount(&server)
            .await;

        let err = TransactionService::new(h.api.clone())
            .get(&TransactionId::new("missing"))
            .await
            .unwrap_err();

        assert_eq!(handle_api_error(&err), "Recurso no encontrado");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let h = harness("http://127.0.0.1:1", "/dashboard");

        let err = CategoryService::new(h.api.clone()).list().await.unwrap_err();

        assert!(err.is_connectivity());
        assert_eq!(
            handle_api_error(&err),
            "Error de conexión. Verifica tu conexión a internet."
        );
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/");

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&server)
            .await;

        assert!(h.api.health().await);
        assert!(!harness("http://127.0.0.1:1", "/").api.health().await);
    }
}

// =============================================================================
// Service Tests
// =============================================================================

mod services {
    use super::*;

    #[tokio::test]
    async fn test_filters_sent_as_query() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("GET"))
            .and(path("/api/transactions"))
            .and(query_param("type", "expense"))
            .and(query_param("start_date", "2024-03-01"))
            .and(query_param("limit", "5"))
            .respond_with(ok(json!([transaction_json("t1", 12.5, "2024-03-02")])))
            .expect(1)
            .mount(&server)
            .await;

        let filters = TransactionFilters {
            kind: Some(TransactionType::Expense),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            limit: Some(5),
            ..TransactionFilters::default()
        };
        let transactions = TransactionService::new(h.api.clone())
            .list(&filters)
            .await
            .unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 12.5);
    }

    #[tokio::test]
    async fn test_legacy_date_normalized() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("GET"))
            .and(path("/api/transactions/t9"))
            .respond_with(ok(json!({
                "id": "t9",
                "amount": "19.99",
                "type": "income",
                "date": "2024-02-29T00:00:00.000Z",
                "category": { "id": "salary", "name": "Salario" }
            })))
            .mount(&server)
            .await;

        let t = TransactionService::new(h.api.clone())
            .get(&TransactionId::new("t9"))
            .await
            .unwrap();

        assert_eq!(t.transaction_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(t.category_id, CategoryId::new("salary"));
        assert_eq!(t.amount, 19.99);
    }

    #[tokio::test]
    async fn test_envelope_failure_uses_server_message() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/settings");

        Mock::given(method("GET"))
            .and(path("/api/budgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Base de datos no disponible"
            })))
            .mount(&server)
            .await;

        let err = BudgetService::new(h.api.clone()).list().await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ref m) if m == "Base de datos no disponible"));
    }

    #[tokio::test]
    async fn test_envelope_without_data_uses_fallback_message() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("GET"))
            .and(path("/api/transactions/stats"))
            .and(query_param("period", "month"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let err = TransactionService::new(h.api.clone())
            .stats(Some("month"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error al obtener estadísticas");
    }

    #[tokio::test]
    async fn test_delete_checks_success_only() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("DELETE"))
            .and(path("/api/transactions/t1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": null })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/transactions/t2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let service = TransactionService::new(h.api.clone());
        assert!(service.delete(&TransactionId::new("t1")).await.is_ok());
        let err = service.delete(&TransactionId::new("t2")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error al eliminar transacción");
    }

    #[tokio::test]
    async fn test_can_delete_defaults_to_true() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/settings");

        Mock::given(method("GET"))
            .and(path("/api/categories/used/can-delete"))
            .respond_with(ok(json!({ "canDelete": false })))
            .mount(&server)
            .await;

        let service = CategoryService::new(h.api.clone());
        assert!(!service.can_delete(&CategoryId::new("used")).await);
        // No route mounted: 404
        assert!(service.can_delete(&CategoryId::new("free")).await);
    }

    #[tokio::test]
    async fn test_category_search_is_case_insensitive() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/settings");

        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ok(json!([
                category_json("food", "Comida"),
                category_json("salary", "Salario"),
                category_json("fun", "Entretenimiento")
            ])))
            .mount(&server)
            .await;

        let service = CategoryService::new(h.api.clone());
        let found = service.search("COM").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Comida");

        let income = service.income_categories().await.unwrap();
        assert_eq!(income[0].id, CategoryId::new("salary"));
    }

    #[tokio::test]
    async fn test_login_persists_tokens_and_user() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/login");

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_partial_json(json!({ "email": "ana@example.com" })))
            .respond_with(ok(json!({
                "user": user(),
                "access_token": "access-1",
                "refresh_token": "refresh-1"
            })))
            .mount(&server)
            .await;

        let auth = fintrack_client::AuthService::new(h.api.clone());
        let response = auth
            .login(&LoginForm::new("ana@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(response.user, user());
        assert_eq!(h.session.access_token().await.unwrap(), Some("access-1".into()));
        assert_eq!(h.session.current_user().await, Some(user()));
        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/dashboard");
        sign_in(&h.session).await;

        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let auth = fintrack_client::AuthService::new(h.api.clone());
        assert!(auth.logout().await.is_err());
        assert!(!h.session.is_authenticated().await);
    }
}

// =============================================================================
// Resource Container Tests
// =============================================================================

mod resources {
    use super::*;

    async fn loaded_transactions(server: &MockServer, h: &Harness) -> TransactionsStore {
        Mock::given(method("GET"))
            .and(path("/api/transactions"))
            .respond_with(ok(json!([
                transaction_json("t1", 10.0, "2024-03-01"),
                transaction_json("t2", 20.0, "2024-02-01")
            ])))
            .mount(server)
            .await;

        let mut store = TransactionsStore::new(TransactionService::new(h.api.clone()));
        assert!(store.loading());
        store.ensure_loaded().await;
        assert!(!store.loading());
        assert_eq!(store.items().len(), 2);
        store
    }

    #[tokio::test]
    async fn test_dateless_row_does_not_empty_the_list() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        let mut dateless = transaction_json("t2", 20.0, "");
        dateless.as_object_mut().unwrap().remove("transaction_date");

        Mock::given(method("GET"))
            .and(path("/api/transactions"))
            .respond_with(ok(json!([
                transaction_json("t1", 10.0, "2024-03-01"),
                dateless,
                transaction_json("t3", 30.0, "2024-02-01")
            ])))
            .mount(&server)
            .await;

        let mut store = TransactionsStore::new(TransactionService::new(h.api.clone()));
        store.ensure_loaded().await;

        let ids: Vec<&TransactionId> = store.items().iter().map(|t| &t.id).collect();
        assert_eq!(
            ids,
            vec![&TransactionId::new("t1"), &TransactionId::new("t3")]
        );
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_create_prepends() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");
        let mut store = loaded_transactions(&server, &h).await;

        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .respond_with(ok(transaction_json("t3", 30.0, "2024-03-02")))
            .mount(&server)
            .await;

        let created = store.create(&expense_form(30.0)).await;

        assert_eq!(created.map(|t| t.id), Some(TransactionId::new("t3")));
        assert_eq!(store.items()[0].id, TransactionId::new("t3"));
        assert_eq!(store.items().len(), 3);
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_items() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");
        let mut store = loaded_transactions(&server, &h).await;

        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(store.create(&expense_form(30.0)).await.is_none());
        assert_eq!(store.items().len(), 2);
        assert_eq!(
            store.error(),
            Some("Error interno del servidor. Intenta más tarde.")
        );
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_server() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");
        let mut store = loaded_transactions(&server, &h).await;

        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .respond_with(ok(transaction_json("t3", 30.0, "2024-03-02")))
            .expect(0)
            .mount(&server)
            .await;

        assert!(store.create(&expense_form(0.0)).await.is_none());
        assert_eq!(store.error(), Some("La cantidad debe ser un número positivo"));
    }

    #[tokio::test]
    async fn test_update_and_delete_splice() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");
        let mut store = loaded_transactions(&server, &h).await;

        Mock::given(method("PUT"))
            .and(path("/api/transactions/t2"))
            .respond_with(ok(transaction_json("t2", 25.0, "2024-02-01")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/transactions/t1"))
            .respond_with(ok(Value::Null))
            .mount(&server)
            .await;

        let update = TransactionUpdate {
            amount: Some(25.0),
            ..TransactionUpdate::default()
        };
        assert!(store.update(&TransactionId::new("t2"), &update).await.is_some());
        assert_eq!(store.items()[1].amount, 25.0);

        assert!(store.delete(&TransactionId::new("t1")).await);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, TransactionId::new("t2"));
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/transactions");

        Mock::given(method("GET"))
            .and(path("/api/budgets"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut store = fintrack_client::BudgetsStore::new(BudgetService::new(h.api.clone()));
        store.fetch().await;

        assert!(!store.loading());
        assert!(store.items().is_empty());
        assert_eq!(
            store.error(),
            Some("Servidor temporalmente no disponible. Intenta más tarde.")
        );
    }

    #[tokio::test]
    async fn test_category_minimum_enforced() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/settings");

        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ok(json!([
                category_json("a", "Comida"),
                category_json("b", "Transporte"),
                category_json("c", "Salud"),
                category_json("d", "Salario")
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/categories/d"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = CategoriesStore::new(CategoryService::new(h.api.clone()));
        store.fetch().await;

        assert!(store.delete_keeping_minimum(&CategoryId::new("d")).await);
        assert_eq!(store.items().len(), 3);

        assert!(!store.delete_keeping_minimum(&CategoryId::new("c")).await);
        assert_eq!(store.items().len(), 3);
        assert_eq!(store.error(), Some("Se requieren como mínimo 3 categorías."));
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/settings");

        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ok(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let result =
            fintrack_client::search_categories(&CategoryService::new(h.api.clone()), "  ").await;
        assert!(!result.loading());
        assert_eq!(result.value().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_absent_id_skips_request() {
        let h = harness("http://127.0.0.1:1", "/transactions");
        let service = TransactionService::new(h.api.clone());

        let state = fintrack_client::load_transaction(&service, None).await;
        assert!(!state.loading());
        assert!(state.value().is_none());
        assert!(state.error().is_none());
    }
}

// =============================================================================
// Backend Selection Tests
// =============================================================================

mod fallback {
    use super::*;

    fn config(environment: Environment, url: &str) -> ClientConfig {
        let mut config = ClientConfig {
            environment,
            api_url: url.to_string(),
            api_url_production: url.to_string(),
            ..ClientConfig::default()
        };
        config.fallback.latency_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_unreachable_api_switches_to_mock() {
        let h = harness("http://127.0.0.1:1", "/login");
        let config = config(Environment::Development, "http://127.0.0.1:1");
        let backend = select_backend(&config, &h.api, h.session.clone()).await;

        let response = backend
            .login(&LoginForm::new(MOCK_EMAIL, MOCK_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.user.email, "test@test.com");
        assert!(h.session.fallback_enabled().await);

        let err = backend
            .login(&LoginForm::new(MOCK_EMAIL, "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn test_server_error_switches_to_mock() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/login");

        Mock::given(method("GET"))
            .and(path("/api/auth/verify"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let backend = select_backend(
            &config(Environment::Development, &server.uri()),
            &h.api,
            h.session.clone(),
        )
        .await;

        let user = backend.verify_token().await.unwrap();
        assert_eq!(user.id, UserId::new("mock-user"));
        assert!(h.session.fallback_enabled().await);
    }

    #[tokio::test]
    async fn test_rejected_login_switches_to_mock() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/login");

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Email o contraseña incorrectos"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = select_backend(
            &config(Environment::Development, &server.uri()),
            &h.api,
            h.session.clone(),
        )
        .await;

        let response = backend
            .login(&LoginForm::new(MOCK_EMAIL, MOCK_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.user.email, MOCK_EMAIL);
        assert!(response.access_token.starts_with("mock-jwt-token-"));
        assert!(h.session.fallback_enabled().await);
        assert_eq!(
            h.session.store().get(DEV_FALLBACK_KEY).await.unwrap(),
            Some("true".to_string())
        );
        assert!(h.navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_registration_switches_to_mock() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/signup");

        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "success": false,
                "message": "El email ya está registrado"
            })))
            .mount(&server)
            .await;

        let backend = select_backend(
            &config(Environment::Development, &server.uri()),
            &h.api,
            h.session.clone(),
        )
        .await;

        let form = RegisterForm {
            email: "nuevo@example.com".into(),
            password: "secret1".into(),
            username: "nuevo".into(),
            display_name: "Nuevo".into(),
        };
        let response = backend.register(&form).await.unwrap();

        assert_eq!(response.user.email, "nuevo@example.com");
        assert!(h.session.fallback_enabled().await);
    }

    #[tokio::test]
    async fn test_rejected_verification_does_not_switch() {
        let server = MockServer::start().await;
        let h = harness(&server.uri(), "/dashboard");
        sign_in(&h.session).await;

        Mock::given(method("GET"))
            .and(path("/api/auth/verify"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let backend = select_backend(
            &config(Environment::Development, &server.uri()),
            &h.api,
            h.session.clone(),
        )
        .await;

        let err = backend.verify_token().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!h.session.fallback_enabled().await);
    }

    #[tokio::test]
    async fn test_production_never_uses_mock() {
        let h = harness("http://127.0.0.1:1", "/login");
        h.session.set_fallback_enabled(true).await.unwrap();

        let backend = select_backend(
            &config(Environment::Production, "http://127.0.0.1:1"),
            &h.api,
            h.session.clone(),
        )
        .await;

        assert_eq!(backend.name(), "remote");
        let err = backend
            .login(&LoginForm::new(MOCK_EMAIL, MOCK_PASSWORD))
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_flag_without_auto_fallback_selects_mock() {
        let h = harness("http://127.0.0.1:1", "/login");
        h.session.set_fallback_enabled(true).await.unwrap();

        let mut config = config(Environment::Development, "http://127.0.0.1:1");
        config.fallback.auto_fallback = false;

        let backend = select_backend(&config, &h.api, h.session.clone()).await;
        assert_eq!(backend.name(), "mock");

        h.session.set_fallback_enabled(false).await.unwrap();
        let backend = select_backend(&config, &h.api, h.session.clone()).await;
        assert_eq!(backend.name(), "remote");
    }
}
