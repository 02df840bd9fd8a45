//! Principal middleware and actor extractors.
//!
//! The middleware runs on every `/api/v1` request. It resolves the
//! `Authorization` header once and stores the [`Actor`] in the request
//! extensions. A request without the header passes through anonymously; a
//! request with a bad header is rejected with 401 before any handler runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use syllabus_core::Actor;

use crate::auth::PrincipalResolver;
use crate::error::ApiError;

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Resolve the caller and inject it into request extensions.
///
/// # Example
///
/// ```ignore
/// use axum::{middleware::from_fn_with_state, Router};
/// use syllabus_api::middleware::principal_middleware;
///
/// let app = Router::new()
///     .route("/api/v1/courses", axum::routing::get(|| async { "OK" }))
///     .layer(from_fn_with_state(resolver, principal_middleware));
/// ```
pub async fn principal_middleware(
    State(resolver): State<PrincipalResolver>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::invalid_token("Authorization header is not valid ASCII"))
        })
        .transpose()?;

    if let Some(actor) = resolver.resolve_optional(authorization)? {
        tracing::debug!(actor_id = actor.id, role = %actor.role, "principal resolved");
        request.extensions_mut().insert(actor);
    }

    Ok(next.run(request).await)
}

// ============================================================================
// TYPED EXTRACTORS
// ============================================================================

/// The authenticated caller. Rejects anonymous requests with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(CurrentActor(actor): CurrentActor) -> Json<Actor> {
///     Json(actor)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(CurrentActor)
            .ok_or_else(|| {
                ApiError::unauthorized("Authentication required: provide an Authorization header")
            })
    }
}

impl std::ops::Deref for CurrentActor {
    type Target = Actor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The caller if one authenticated, for endpoints open to anonymous reads.
#[derive(Debug, Clone, Copy)]
pub struct OptionalActor(pub Option<Actor>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalActor(parts.extensions.get::<Actor>().copied()))
    }
}

impl OptionalActor {
    pub fn as_ref(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}
