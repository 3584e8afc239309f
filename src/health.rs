/*!
 * # Health Check Module
 *
 * Endpoints for monitoring the service:
 *
 * - `/health` - overall status including a database ping
 * - `/health/live` - process liveness
 * - `/health/ready` - readiness to accept traffic
 */

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub database: HealthStatus,
}

#[derive(Clone)]
pub struct HealthState {
    pub db: Arc<DatabaseConnection>,
    pub start_time: SystemTime,
}

impl HealthState {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    async fn check(&self) -> HealthInfo {
        let database = match self.db.ping().await {
            Ok(_) => HealthStatus::Up,
            Err(e) => {
                error!("Database health check failed: {}", e);
                HealthStatus::Down
            }
        };

        HealthInfo {
            status: database,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            uptime_seconds: self.uptime(),
            database,
        }
    }
}

pub fn health_routes(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .with_state(state)
}

async fn health(State(state): State<HealthState>) -> impl IntoResponse {
    let info = state.check().await;
    let status = match info.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(info))
}

async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "up", "timestamp": Utc::now().to_rfc3339() }))
}

async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "timestamp": Utc::now().to_rfc3339() })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "timestamp": Utc::now().to_rfc3339() })),
        ),
    }
}
