//! Assignment-related API types

use serde::{Deserialize, Serialize};
use syllabus_core::{
    Assignment, AssignmentId, AssignmentPatch, CourseId, NewAssignment, Timestamp,
    DEFAULT_MAX_SCORE,
};

use crate::validation::{
    validate_max_score, HasUpdates, Validate, ValidateNonEmpty, ValidationResult,
};

/// Request to create a new assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAssignmentRequest {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    /// Defaults to 100
    #[serde(default)]
    pub max_score: Option<u32>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub due_date: Timestamp,
}

impl Validate for CreateAssignmentRequest {
    fn validate(&self) -> ValidationResult {
        self.title.validate_non_empty("title")?;
        if let Some(max_score) = self.max_score {
            validate_max_score("max_score", max_score)?;
        }
        Ok(())
    }
}

impl From<CreateAssignmentRequest> for NewAssignment {
    fn from(req: CreateAssignmentRequest) -> Self {
        NewAssignment {
            course_id: req.course_id,
            title: req.title,
            description: req.description,
            instructions: req.instructions,
            max_score: req.max_score.unwrap_or(DEFAULT_MAX_SCORE),
            due_date: req.due_date,
        }
    }
}

/// Request to update an existing assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub max_score: Option<u32>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
}

impl HasUpdates for UpdateAssignmentRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.instructions.is_some()
            || self.max_score.is_some()
            || self.due_date.is_some()
    }
}

impl Validate for UpdateAssignmentRequest {
    fn validate(&self) -> ValidationResult {
        self.validate_has_updates()?;
        self.title.validate_non_empty("title")?;
        if let Some(max_score) = self.max_score {
            validate_max_score("max_score", max_score)?;
        }
        Ok(())
    }
}

impl From<UpdateAssignmentRequest> for AssignmentPatch {
    fn from(req: UpdateAssignmentRequest) -> Self {
        AssignmentPatch {
            title: req.title,
            description: req.description,
            instructions: req.instructions,
            max_score: req.max_score,
            due_date: req.due_date,
        }
    }
}

/// Assignment as returned to clients, with `is_overdue` evaluated at
/// response time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub is_overdue: bool,
}

impl AssignmentView {
    pub fn at(assignment: Assignment, now: Timestamp) -> Self {
        let is_overdue = assignment.is_overdue(now);
        Self {
            assignment,
            is_overdue,
        }
    }
}

/// Mean score over graded submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AverageScoreResponse {
    pub assignment_id: AssignmentId,
    /// `null` while nothing is graded
    pub average_score: Option<f64>,
}
