//! REST API Routes Module
//!
//! Route handlers organized by resource:
//! - Course catalogue, lessons and assignments (anonymous reads of public content)
//! - Enrollments and submissions (authenticated)
//! - Auth helpers (`/auth/me`, development tokens)
//! - Health checks
//! - OpenAPI document
//! - CORS support for browser-based clients

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod lessons;
pub mod submissions;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use syllabus_storage::CacheRead;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware::principal_middleware;
use crate::state::AppState;

/// Response header telling clients whether a read was served from cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// JSON body plus `x-cache: HIT|MISS`.
pub(crate) fn cached<T: Serialize>(read: CacheRead<T>) -> impl IntoResponse {
    let status = if read.was_cache_hit() { "HIT" } else { "MISS" };
    (
        [(HeaderName::from_static(CACHE_STATUS_HEADER), status)],
        Json(read.into_value()),
    )
}

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow any origin; production refuses that at startup.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(CACHE_STATUS_HEADER)])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Resource routes under /api/v1/* behind the principal middleware
/// - Health checks at /health and /health/ping (no auth)
/// - OpenAPI document at /openapi.json
/// - Swagger UI at /swagger-ui (when the swagger-ui feature is enabled)
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. Trace - one span per request
/// 3. Principal (only on /api/v1/*) - resolves the bearer token
pub fn create_api_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/courses", courses::create_router())
        .nest("/lessons", lessons::create_router())
        .nest("/assignments", assignments::create_router())
        .nest("/enrollments", enrollments::create_router())
        .nest("/submissions", submissions::create_router())
        .nest("/auth", auth::create_router(&state.api_config))
        .layer(from_fn_with_state(state.resolver.clone(), principal_middleware));

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router());

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", get(openapi_json));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/swagger-ui/openapi.json", crate::openapi::ApiDoc::openapi()),
        );
    }

    let cors = build_cors_layer(&state.api_config);

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use chrono::Utc;

    #[test]
    fn test_cached_sets_cache_header() {
        let hit = cached(CacheRead::from_cache(1u32, Utc::now())).into_response();
        assert_eq!(hit.headers()[CACHE_STATUS_HEADER], "HIT");

        let miss = cached(CacheRead::from_storage(1u32, Utc::now())).into_response();
        assert_eq!(miss.headers()[CACHE_STATUS_HEADER], "MISS");
    }

    #[test]
    fn test_cors_layer_builds_for_configured_origins() {
        let config = ApiConfig {
            cors_origins: vec!["https://app.example.com".to_string()],
            cors_allow_credentials: true,
            ..ApiConfig::default()
        };
        let _layer = build_cors_layer(&config);
        assert!(config.is_origin_allowed("https://app.example.com"));
    }
}
