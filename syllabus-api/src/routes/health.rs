//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health - Readiness with cache statistics
//!
//! No authentication required for health endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use syllabus_storage::CacheBackend;

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub cache: CacheHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health - Readiness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse),
    ),
)]
pub async fn readiness(
    State(cache): State<Arc<dyn CacheBackend>>,
    State(start_time): State<std::time::Instant>,
) -> impl IntoResponse {
    let cache_health = check_cache(cache.as_ref()).await;
    let status = cache_health.status;

    let response = HealthResponse {
        status,
        message: None,
        details: Some(HealthDetails {
            cache: cache_health,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

async fn check_cache(cache: &dyn CacheBackend) -> CacheHealth {
    match cache.stats().await {
        Ok(stats) => CacheHealth {
            status: HealthStatus::Healthy,
            entries: Some(stats.entry_count),
            hit_rate: Some(stats.hit_rate()),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "cache health check failed");
            CacheHealth {
                status: HealthStatus::Unhealthy,
                entries: None,
                hit_rate: None,
                error: Some(e.to_string()),
            }
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router (no auth required)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(readiness))
        .route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabus_core::SystemClock;
    use syllabus_storage::InMemoryCacheBackend;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: Some("All systems operational".to_string()),
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(!json.contains("details"));
    }

    #[tokio::test]
    async fn test_check_cache_reports_entries() {
        let backend = InMemoryCacheBackend::new(Arc::new(SystemClock));
        let health = check_cache(&backend).await;

        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.entries, Some(0));
        assert_eq!(health.hit_rate, Some(0.0));
    }
}
