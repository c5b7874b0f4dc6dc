/*!
 * # Health Check Module
 *
 * Liveness and readiness endpoints for the production tracker.
 *
 * - Basic health check (`/health`) - process is up
 * - Readiness check (`/health/ready`) - database answers a ping
 * - Version (`/health/version`) - build information
 */

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
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error};

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Result of a readiness probe
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadinessReport {
    pub ready: bool,
    pub database: HealthStatus,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Health check state
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

    pub async fn probe(&self) -> ReadinessReport {
        let database = match crate::db::check_connection(&self.db).await {
            Ok(()) => HealthStatus::Up,
            Err(e) => {
                error!("Database readiness check failed: {}", e);
                HealthStatus::Down
            }
        };

        ReadinessReport {
            ready: database == HealthStatus::Up,
            database,
            uptime_seconds: self.uptime(),
            timestamp: Utc::now(),
        }
    }
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness: answers as long as the process serves requests
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": state.uptime(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Readiness: 503 until the database answers
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let report = state.probe().await;
    let status_code = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(report))
}

/// Creates router with health check endpoints
pub fn health_routes(db: Arc<DatabaseConnection>) -> Router {
    let state = Arc::new(HealthState::new(db));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/version", get(version_info))
        .with_state(state)
}
