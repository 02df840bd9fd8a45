//! Syllabus API - REST Layer for Course Management
//!
//! Exposes courses, lessons, assignments, enrollments and submissions over
//! HTTP (Axum). Every request is resolved to an optional [`Actor`] by the
//! principal middleware; resource services authorize each operation, serve
//! reads through the shared cache and invalidate it after successful writes.
//!
//! [`Actor`]: syllabus_core::Actor

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use auth::{
    encode_claims, issue_token, AuthConfig, Claims, CredentialError, CredentialVerifier,
    JwtSecret, JwtVerifier, PrincipalResolver, VerifiedClaims,
};
pub use config::{ApiConfig, Environment};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{principal_middleware, CurrentActor, OptionalActor};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::{create_api_router, CACHE_STATUS_HEADER};
pub use seed::seed_demo_data;
pub use services::{ServiceContext, Services};
pub use state::AppState;
pub use types::*;

#[cfg(test)]
pub(crate) mod test_env {
    //! Environment variable helpers for config tests.

    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Sets (or removes) a variable and restores the previous value on drop.
    pub struct EnvVarGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvVarGuard {
        pub fn set(key: &'static str, value: Option<&str>) -> Self {
            let original = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_deref() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}
