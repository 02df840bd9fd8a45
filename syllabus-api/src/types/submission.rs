//! Submission API types

use serde::{Deserialize, Serialize};
use syllabus_core::AssignmentId;

use crate::validation::{validate_score, Validate, ValidateNonEmpty, ValidationResult};

/// Request to submit an answer to an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitRequest {
    pub assignment_id: AssignmentId,
    pub content: String,
}

impl Validate for SubmitRequest {
    fn validate(&self) -> ValidationResult {
        self.content.validate_non_empty("content")
    }
}

/// Request to grade a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GradeRequest {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

impl GradeRequest {
    /// Score bounds depend on the assignment.
    pub fn validate_against(&self, max_score: u32) -> ValidationResult {
        validate_score("score", self.score, max_score)
    }
}
