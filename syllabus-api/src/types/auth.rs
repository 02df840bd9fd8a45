//! Authentication API types

use serde::{Deserialize, Serialize};
use syllabus_core::{ActorId, Role};

use crate::validation::{Validate, ValidationResult};

/// Request for a development token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DevTokenRequest {
    pub actor_id: ActorId,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Validate for DevTokenRequest {
    fn validate(&self) -> ValidationResult {
        if self.actor_id <= 0 {
            return Err(syllabus_core::ValidationError::InvalidValue {
                field: "actor_id".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

/// Signed bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
