//! Enrollment API types

use serde::{Deserialize, Serialize};
use syllabus_core::CourseId;

/// Request to enroll the calling learner in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnrollRequest {
    pub course_id: CourseId,
}
