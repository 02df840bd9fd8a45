//! Shared harness for router-level tests.
//!
//! Builds the real router over an in-memory store and cache driven by a
//! manual clock, mints tokens with the same config the middleware verifies
//! against, and sends requests through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use syllabus_api::{create_api_router, issue_token, ApiConfig, AppState, AuthConfig, JwtSecret};
use syllabus_core::{Actor, ManualClock};
use syllabus_storage::{InMemoryCacheBackend, InMemoryStore};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub store: InMemoryStore,
    pub cache: Arc<InMemoryCacheBackend>,
    pub auth: AuthConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn cache_status(&self) -> Option<&str> {
        self.headers
            .get(syllabus_api::CACHE_STATUS_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(|c| c.as_str())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_api_config(ApiConfig::default())
    }

    pub fn with_api_config(api_config: ApiConfig) -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(ManualClock::starting_at(start));
        let auth = AuthConfig {
            jwt_secret: JwtSecret::new(TEST_SECRET.to_string()).expect("valid secret"),
            ..AuthConfig::default()
        }
        .with_clock(clock.clone());

        let store = InMemoryStore::with_clock(clock.clone());
        let cache = Arc::new(InMemoryCacheBackend::new(clock.clone()));
        let state = AppState::new(
            Arc::new(store.clone()),
            cache.clone(),
            api_config,
            auth.clone(),
        );

        Self {
            router: create_api_router(state),
            clock,
            store,
            cache,
            auth,
        }
    }

    pub fn token(&self, actor: Actor) -> String {
        issue_token(&self.auth, &actor).expect("token issued")
    }

    pub fn bearer(&self, actor: Actor) -> String {
        format!("Bearer {}", self.token(actor))
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, authorization, None)).await
    }

    pub async fn post(
        &self,
        uri: &str,
        authorization: Option<&str>,
        body: serde_json::Value,
    ) -> TestResponse {
        self.send(request(Method::POST, uri, authorization, Some(body)))
            .await
    }

    pub async fn put(
        &self,
        uri: &str,
        authorization: Option<&str>,
        body: serde_json::Value,
    ) -> TestResponse {
        self.send(request(Method::PUT, uri, authorization, Some(body)))
            .await
    }

    pub async fn delete(&self, uri: &str, authorization: Option<&str>) -> TestResponse {
        self.send(request(Method::DELETE, uri, authorization, None))
            .await
    }
}

pub fn request(
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}
