use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;
use uuid::Uuid;

use comanda_api::{
    auth::permission,
    build_app,
    config::AppConfig,
    db,
    entities::{customization_choice, dining_table, menu_item},
    events::Event,
    AppState,
};

/// Helper harness for spinning up an application backed by a throwaway
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_file = std::env::temp_dir().join(format!("comanda_test_{}.db", Uuid::new_v4()));

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(std::sync::Arc::new(pool), cfg);

        let token = state
            .auth
            .issue_token(
                1,
                "Test Waiter",
                vec!["waiter".to_string()],
                vec![
                    permission::ORDERS_READ.to_string(),
                    permission::ORDERS_CREATE.to_string(),
                    permission::ORDERS_UPDATE.to_string(),
                    permission::MENU_READ.to_string(),
                    permission::TABLES_READ.to_string(),
                ],
            )
            .expect("mint test token")
            .access_token;

        let router = build_app(state.clone());

        Self {
            router,
            state,
            token,
        }
    }

    /// Access the bearer token for the default test waiter.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Mint a token with an explicit permission set.
    #[allow(dead_code)]
    pub fn token_with_permissions(&self, permissions: &[&str]) -> String {
        self.state
            .auth
            .issue_token(
                2,
                "Second Waiter",
                vec!["waiter".to_string()],
                permissions.iter().map(|p| p.to_string()).collect(),
            )
            .expect("mint scoped test token")
            .access_token
    }

    /// Subscribe to the order event stream.
    #[allow(dead_code)]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.state.broadcaster.subscribe()
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_table(&self, number: i32, capacity: i32) -> i64 {
        let table = dining_table::ActiveModel {
            number: Set(number),
            capacity: Set(capacity),
            is_occupied: Set(false),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed table for tests");
        table.id
    }

    pub async fn seed_menu_item(&self, name: &str, price: Decimal, available: bool) -> i64 {
        let item = menu_item::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            category: Set("mains".to_string()),
            preparation_time_minutes: Set(15),
            is_available: Set(available),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed menu item for tests");
        item.id
    }

    #[allow(dead_code)]
    pub async fn seed_choice(&self, name: &str, price_extra: Decimal) -> i64 {
        let choice = customization_choice::ActiveModel {
            name: Set(name.to_string()),
            price_extra: Set(price_extra),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed customization choice for tests");
        choice.id
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid JSON")
}
