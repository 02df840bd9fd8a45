//! Entity types for the course catalogue and learner records.
//!
//! Persisted shapes plus the drafts and patches the backing store accepts.
//! Derived values that depend on "now" are methods taking the instant, never
//! stored fields.

use serde::{Deserialize, Serialize};

use crate::{
    ActorId, AssignmentId, CourseId, CourseLevel, EnrollmentId, LessonId, SubmissionId, Timestamp,
};

/// Default maximum score for an assignment.
pub const DEFAULT_MAX_SCORE: u32 = 100;

/// Upper bound of enrollment progress, in percent.
pub const MAX_PROGRESS: u8 = 100;

// ============================================================================
// COURSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Unique across all courses.
    pub slug: String,
    pub description: String,
    pub instructor_id: ActorId,
    pub category: String,
    pub level: CourseLevel,
    pub is_active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Course list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    /// Active enrollments.
    pub enrollment_count: u64,
}

/// Course detail with embedded published lessons and all assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub enrollment_count: u64,
    pub lessons: Vec<Lesson>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructor_id: ActorId,
    pub category: String,
    pub level: CourseLevel,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub is_active: Option<bool>,
}

// ============================================================================
// LESSON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    /// Unique within the owning course.
    pub slug: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration_minutes: u32,
    pub order: u32,
    pub is_published: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLesson {
    pub course_id: CourseId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration_minutes: u32,
    pub order: u32,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<Option<String>>,
    pub duration_minutes: Option<u32>,
    pub order: Option<u32>,
    pub is_published: Option<bool>,
}

// ============================================================================
// ASSIGNMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assignment {
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub max_score: u32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub due_date: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Assignment {
    /// Past the due date at `now`.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        now > self.due_date
    }

    /// Whether a submission made at `submitted_at` counts as late.
    pub fn is_late_at(&self, submitted_at: Timestamp) -> bool {
        submitted_at > self.due_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub max_score: u32,
    pub due_date: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub max_score: Option<u32>,
    pub due_date: Option<Timestamp>,
}

// ============================================================================
// ENROLLMENT
// ============================================================================

/// A learner's membership in a course. One record per (learner, course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub learner_id: ActorId,
    pub course_id: CourseId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub enrolled_at: Timestamp,
    pub is_active: bool,
    /// Completion percentage, 0 to 100.
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEnrollment {
    pub learner_id: ActorId,
    pub course_id: CourseId,
}

// ============================================================================
// SUBMISSION
// ============================================================================

/// A learner's answer to an assignment. One record per (assignment, learner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub learner_id: ActorId,
    pub content: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub submitted_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    /// Fixed when the submission is created.
    pub is_late: bool,
    pub score: Option<f64>,
    pub feedback: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub graded_at: Option<Timestamp>,
    pub graded_by: Option<ActorId>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }
}

/// The store stamps `submitted_at` and derives `is_late` from the
/// assignment's due date at that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub assignment_id: AssignmentId,
    pub learner_id: ActorId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionGrade {
    pub score: f64,
    pub feedback: String,
    pub graded_by: ActorId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn assignment_due(due: Timestamp) -> Assignment {
        Assignment {
            id: 1,
            course_id: 1,
            title: "Python Basics Quiz".to_string(),
            description: String::new(),
            instructions: String::new(),
            max_score: DEFAULT_MAX_SCORE,
            due_date: due,
            created_at: due - Duration::days(7),
        }
    }

    #[test]
    fn test_assignment_overdue_is_strict() {
        let due = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let assignment = assignment_due(due);

        assert!(!assignment.is_overdue(due));
        assert!(assignment.is_overdue(due + Duration::seconds(1)));
        assert!(!assignment.is_late_at(due - Duration::seconds(1)));
        assert!(assignment.is_late_at(due + Duration::seconds(1)));
    }

    #[test]
    fn test_submission_is_graded_follows_score() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut submission = Submission {
            id: 1,
            assignment_id: 1,
            learner_id: 3,
            content: "answers".to_string(),
            submitted_at: now,
            updated_at: now,
            is_late: false,
            score: None,
            feedback: String::new(),
            graded_at: None,
            graded_by: None,
        };
        assert!(!submission.is_graded());

        submission.score = Some(0.0);
        assert!(submission.is_graded());
    }

    #[test]
    fn test_course_summary_flattens_course() -> Result<(), serde_json::Error> {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summary = CourseSummary {
            course: Course {
                id: 1,
                title: "Python Programming Fundamentals".to_string(),
                slug: "python-programming".to_string(),
                description: String::new(),
                instructor_id: 2,
                category: "Programming".to_string(),
                level: CourseLevel::Beginner,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            enrollment_count: 3,
        };

        let json = serde_json::to_value(&summary)?;
        assert_eq!(json["slug"], "python-programming");
        assert_eq!(json["enrollment_count"], 3);

        let back: CourseSummary = serde_json::from_value(json)?;
        assert_eq!(back, summary);
        Ok(())
    }
}
