//! Path extractor for entity ids.
//!
//! Axum's plain `Path<i64>` rejects with a text body; `PathId` rejects with
//! the same JSON error shape as every other endpoint.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use syllabus_core::EntityId;

use crate::error::ApiError;

/// A positive entity id taken from the single `:id` path segment.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_course(PathId(id): PathId) -> ApiResult<impl IntoResponse> {
///     // id is a validated EntityId
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("Invalid path parameter: {}", e)))?;

        parse_id(&raw).map(PathId)
    }
}

fn parse_id(raw: &str) -> Result<EntityId, ApiError> {
    raw.parse::<EntityId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid_format("id", "a positive integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").ok(), Some(42));
        assert_eq!(parse_id("0").map_err(|e| e.code), Err(ErrorCode::InvalidFormat));
        assert_eq!(parse_id("-3").map_err(|e| e.code), Err(ErrorCode::InvalidFormat));
        assert_eq!(parse_id("abc").map_err(|e| e.code), Err(ErrorCode::InvalidFormat));
    }
}
