//! Comanda API Library
//!
//! Backend for a restaurant point of sale: menu catalogue, table-scoped
//! orders with server-computed prices, a status state machine, and a
//! websocket push channel for order events.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod openapi;
pub mod pricing;
pub mod repositories;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderValue, response::Json, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::ToSchema;

use crate::auth::permission as perm;
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub broadcaster: events::EventBroadcaster,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let broadcaster = events::EventBroadcaster::new(config.event_buffer_size);
        let auth = Arc::new(auth::AuthService::new(auth::AuthConfig::from_app_config(
            &config,
        )));
        let services = handlers::AppServices::new(db.clone(), broadcaster.clone());

        Self {
            db,
            config,
            auth,
            broadcaster,
            services,
        }
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// The `/api/v1` surface, with permission gating per route group.
pub fn api_v1_routes() -> Router<AppState> {
    let orders_read = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .with_permission(perm::ORDERS_READ);

    let orders_create = Router::new()
        .route(
            "/orders",
            axum::routing::post(handlers::orders::create_order),
        )
        .with_permission(perm::ORDERS_CREATE);

    let orders_update = Router::new()
        .route(
            "/orders/{id}/status",
            axum::routing::put(handlers::orders::update_order_status),
        )
        .with_permission(perm::ORDERS_UPDATE);

    let menu = Router::new()
        .route("/menu/items", get(handlers::menu::list_menu_items))
        .route("/menu/items/{id}", get(handlers::menu::get_menu_item))
        .route(
            "/menu/customizations",
            get(handlers::menu::list_customization_choices),
        )
        .with_permission(perm::MENU_READ);

    let tables = Router::new()
        .route("/tables", get(handlers::tables::list_tables))
        .route("/tables/{id}", get(handlers::tables::get_table))
        .with_permission(perm::TABLES_READ);

    Router::new()
        .route("/status", get(api_status))
        .merge(orders_read)
        .merge(orders_create)
        .merge(orders_update)
        .merge(menu)
        .merge(tables)
}

/// Assemble the full application router.
///
/// Shared between `main` and the integration test harness so both exercise
/// the same middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));
    let auth_service = state.auth.clone();
    let health = health::health_routes(health::HealthState::new(state.db.clone()));

    let api = Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/ws/orders", get(handlers::ws::orders_ws))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(health)
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(timeout)
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    if config.should_allow_permissive_cors() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "service": "comanda-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}
