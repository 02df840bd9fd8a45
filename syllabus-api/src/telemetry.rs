//! Tracing subscriber initialization
//!
//! `RUST_LOG` selects what is logged (default: `syllabus_api=debug,tower_http=debug,info`).
//! `SYLLABUS_LOG_FORMAT=json` switches from human-readable lines to JSON.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

const DEFAULT_FILTER: &str = "syllabus_api=debug,syllabus_storage=info,tower_http=debug,info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            _ => Err(()),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "syllabus-api".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let format = std::env::var("SYLLABUS_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup before any tracing occurs.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        format = ?config.format,
        "Telemetry initialized"
    );
    Ok(())
}
