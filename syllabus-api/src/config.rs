//! API Configuration Module
//!
//! Server binding, CORS, deployment environment, demo seeding and cache ttls.
//! Configuration is loaded from environment variables with defaults suited
//! to local development.

use std::net::SocketAddr;
use std::time::Duration;

use syllabus_storage::CacheConfig;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    /// Anything other than `production`/`prod` is development.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        })
    }
}

impl Environment {
    /// Read `SYLLABUS_ENVIRONMENT`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("SYLLABUS_ENVIRONMENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,
    pub environment: Environment,

    /// Populate the store with the demo catalogue at startup.
    pub seed_demo_data: bool,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins, which production refuses.
    pub cors_origins: Vec<String>,

    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Cache
    // ========================================================================
    pub cache: CacheConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Development,
            seed_demo_data: false,
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            cache: CacheConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SYLLABUS_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `SYLLABUS_API_PORT`: Listen port (default: 3000)
    /// - `SYLLABUS_ENVIRONMENT`: "development" or "production"
    /// - `SYLLABUS_SEED_DEMO_DATA`: "true" to seed demo courses (default: false)
    /// - `SYLLABUS_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `SYLLABUS_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `SYLLABUS_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `SYLLABUS_CACHE_LIST_TTL_SECS`: List entry ttl (default: 300)
    /// - `SYLLABUS_CACHE_DETAIL_TTL_SECS`: Detail entry ttl (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("SYLLABUS_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let port = env_parse("PORT")
            .or_else(|| env_parse("SYLLABUS_API_PORT"))
            .unwrap_or(defaults.port);

        let mut cache = CacheConfig::default();
        if let Some(secs) = env_parse::<u64>("SYLLABUS_CACHE_LIST_TTL_SECS") {
            cache = cache.with_list_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = env_parse::<u64>("SYLLABUS_CACHE_DETAIL_TTL_SECS") {
            cache = cache.with_detail_ttl(Duration::from_secs(secs));
        }

        Self {
            bind_host: std::env::var("SYLLABUS_API_BIND").unwrap_or(defaults.bind_host),
            port,
            environment: Environment::from_env(),
            seed_demo_data: env_flag("SYLLABUS_SEED_DEMO_DATA").unwrap_or(false),
            cors_origins,
            cors_allow_credentials: env_flag("SYLLABUS_CORS_ALLOW_CREDENTIALS").unwrap_or(false),
            cors_max_age_secs: env_parse("SYLLABUS_CORS_MAX_AGE_SECS")
                .unwrap_or(defaults.cors_max_age_secs),
            cache,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Refuse permissive CORS in production.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        if self.is_production() && self.cors_origins.is_empty() {
            return Err(ApiError::invalid_input(
                "SYLLABUS_CORS_ORIGINS must list allowed origins in production",
            ));
        }
        Ok(())
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.edu
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_env::{EnvVarGuard, ENV_MUTEX};

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.port, 3000);
        assert!(!config.is_production());
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse(), Ok(Environment::Production));
        assert_eq!(" Production ".parse(), Ok(Environment::Production));
        assert_eq!("staging".parse(), Ok(Environment::Development));
    }

    #[test]
    fn test_from_env_reads_overrides() {
        let _env_lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _port = EnvVarGuard::set("PORT", None);
        let _api_port = EnvVarGuard::set("SYLLABUS_API_PORT", Some("8081"));
        let _seed = EnvVarGuard::set("SYLLABUS_SEED_DEMO_DATA", Some("true"));
        let _origins = EnvVarGuard::set(
            "SYLLABUS_CORS_ORIGINS",
            Some("https://learn.example.edu, ,https://admin.example.edu"),
        );
        let _list_ttl = EnvVarGuard::set("SYLLABUS_CACHE_LIST_TTL_SECS", Some("30"));
        let _detail_ttl = EnvVarGuard::set("SYLLABUS_CACHE_DETAIL_TTL_SECS", None);

        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8081);
        assert!(config.seed_demo_data);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.cache.list_ttl, Duration::from_secs(30));
        assert_eq!(config.cache.detail_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_production_requires_origins() {
        let mut config = ApiConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.validate_for_production().is_err());

        config.cors_origins = vec!["https://learn.example.edu".to_string()];
        assert!(config.validate_for_production().is_ok());
    }

    #[test]
    fn test_bind_addr() -> ApiResult<()> {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 4000,
            ..Default::default()
        };
        assert_eq!(config.bind_addr()?.port(), 4000);

        let bad = ApiConfig {
            bind_host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(bad.bind_addr().is_err());
        Ok(())
    }

    #[test]
    fn test_origin_allowed() {
        let mut config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));

        config.cors_origins = vec![
            "https://learn.example.edu".to_string(),
            "*.courses.example.edu".to_string(),
        ];
        assert!(config.is_origin_allowed("https://learn.example.edu"));
        assert!(config.is_origin_allowed("https://cs101.courses.example.edu"));
        assert!(!config.is_origin_allowed("https://evil.com"));
        assert!(!config.is_origin_allowed("https://evilcourses.example.edu"));
    }
}
