//! Syllabus API Server Entry Point
//!
//! Loads configuration, wires the in-memory store and cache, optionally
//! seeds demo data and starts the Axum HTTP server.

use std::sync::Arc;

use syllabus_api::telemetry::{init_tracing, TelemetryConfig};
use syllabus_api::{create_api_router, seed_demo_data, ApiConfig, ApiError, ApiResult, AppState, AuthConfig};
use syllabus_core::Clock;
use syllabus_storage::{InMemoryCacheBackend, InMemoryStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();

    auth_config.validate_for_production(api_config.environment)?;
    api_config.validate_for_production()?;

    let clock = auth_config.clock.clone();
    let store = InMemoryStore::with_clock(clock.clone());
    if api_config.seed_demo_data {
        seed_demo_data(&store, clock.now()).await?;
    }
    let cache_backend = Arc::new(InMemoryCacheBackend::new(clock));

    let addr = api_config.bind_addr()?;
    let state = AppState::new(Arc::new(store), cache_backend, api_config, auth_config);
    let app = create_api_router(state);

    tracing::info!(%addr, "Starting Syllabus API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
