//! Error types for Syllabus operations

use crate::{DenyReason, EntityId, ResourceType};
use thiserror::Error;

/// Backing store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{resource} with id {id} not found")]
    NotFound { resource: ResourceType, id: EntityId },

    #[error("Unique constraint on {resource}.{field} violated")]
    UniqueViolation {
        resource: ResourceType,
        field: String,
    },

    #[error("{resource}.{field} references a missing record")]
    ForeignKeyViolation {
        resource: ResourceType,
        field: String,
    },

    #[error("Backing store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Cache layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Failed to encode cache value for {key}: {reason}")]
    Encode { key: String, reason: String },

    #[error("Cache backend failure: {reason}")]
    Backend { reason: String },
}

/// Error taxonomy surfaced by every service operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LmsError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    Denied(DenyReason),

    #[error("{resource} with id {id} not found")]
    NotFound { resource: ResourceType, id: EntityId },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailure { field: String, reason: String },

    #[error("Backing store failure: {reason}")]
    BackingStoreFailure { reason: String },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl LmsError {
    pub fn not_found(resource: ResourceType, id: EntityId) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Transient store trouble that a read may retry.
    pub fn is_backing_store_failure(&self) -> bool {
        matches!(self, Self::BackingStoreFailure { .. })
    }
}

impl From<StorageError> for LmsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { resource, id } => Self::NotFound { resource, id },
            StorageError::UniqueViolation { resource, field } => Self::ValidationFailure {
                reason: format!("a {} with this {} already exists", resource, field),
                field,
            },
            StorageError::ForeignKeyViolation { resource, field } => Self::ValidationFailure {
                reason: format!("{} references a missing record", resource),
                field,
            },
            StorageError::Unavailable { reason } => Self::BackingStoreFailure { reason },
        }
    }
}

impl From<ValidationError> for LmsError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => Self::ValidationFailure {
                field,
                reason: "is required".to_string(),
            },
            ValidationError::InvalidValue { field, reason } => {
                Self::ValidationFailure { field, reason }
            }
        }
    }
}

/// Result type alias for Syllabus operations.
pub type LmsResult<T> = Result<T, LmsError>;

/// Result type alias for backing store operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            resource: ResourceType::Course,
            id: 42,
        };
        assert_eq!(err.to_string(), "course with id 42 not found");
    }

    #[test]
    fn test_storage_errors_map_into_taxonomy() {
        let err: LmsError = StorageError::NotFound {
            resource: ResourceType::Lesson,
            id: 7,
        }
        .into();
        assert_eq!(err, LmsError::not_found(ResourceType::Lesson, 7));

        let err: LmsError = StorageError::UniqueViolation {
            resource: ResourceType::Course,
            field: "slug".to_string(),
        }
        .into();
        assert!(matches!(err, LmsError::ValidationFailure { ref field, .. } if field == "slug"));

        let err: LmsError = StorageError::Unavailable {
            reason: "connection reset".to_string(),
        }
        .into();
        assert!(err.is_backing_store_failure());
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: LmsError = ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        }
        .into();
        assert_eq!(err, LmsError::validation("title", "is required"));
    }

    #[test]
    fn test_denied_display_includes_reason() {
        let err = LmsError::Denied(DenyReason::NotEnrolled);
        assert_eq!(err.to_string(), "Access denied: not_enrolled");
    }
}
