//! Authentication Endpoints
//!
//! - GET /auth/me - The resolved caller
//! - POST /auth/dev/token - Development token issuance
//!
//! The dev token endpoint signs a token for any actor id and role. It is
//! only mounted outside production and refuses to run in production even if
//! mounted.

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use syllabus_core::{Actor, Clock, LmsError};

use crate::{
    auth::{encode_claims, AuthConfig, Claims},
    config::ApiConfig,
    error::{ApiError, ApiResult},
    middleware::CurrentActor,
    state::AppState,
    types::{DevTokenRequest, TokenResponse},
    validation::Validate,
};

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/v1/auth/me - The authenticated caller
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Resolved actor", body = Actor),
        (status = 401, description = "Missing or invalid credential", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(CurrentActor(actor): CurrentActor) -> Json<Actor> {
    Json(actor)
}

/// POST /api/v1/auth/dev/token - Generate a development token
#[utoipa::path(
    post,
    path = "/api/v1/auth/dev/token",
    tag = "Auth",
    request_body = DevTokenRequest,
    responses(
        (status = 200, description = "Signed token", body = TokenResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Disabled in production", body = ApiError),
    ),
)]
pub async fn generate_dev_token(
    State(api_config): State<Arc<ApiConfig>>,
    State(auth_config): State<Arc<AuthConfig>>,
    Json(request): Json<DevTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    if api_config.is_production() {
        return Err(ApiError::forbidden(
            "Dev authentication is disabled in production",
        ));
    }
    request.validate().map_err(LmsError::from)?;

    let actor = Actor::new(request.actor_id, request.role);
    let claims = Claims::new(
        &actor,
        auth_config.clock.now_epoch_secs(),
        auth_config.jwt_expiration_secs,
    )
    .with_profile(request.email, request.username);
    let token = encode_claims(&auth_config, &claims)?;

    tracing::info!(actor_id = actor.id, role = %actor.role, "Generated dev token");

    Ok(Json(TokenResponse::bearer(
        token,
        auth_config.jwt_expiration_secs,
    )))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(api_config: &ApiConfig) -> Router<AppState> {
    let router = Router::new().route("/me", get(me));

    if api_config.is_production() {
        tracing::info!("Dev auth disabled (production environment)");
        return router;
    }

    tracing::warn!(
        "Dev auth enabled - DO NOT USE IN PRODUCTION! \
         Set SYLLABUS_ENVIRONMENT=production to disable."
    );
    router.route("/dev/token", post(generate_dev_token))
}
