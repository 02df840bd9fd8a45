//! Identity types for Syllabus entities

use chrono::{DateTime, Utc};

/// Store-assigned identifier. Always positive once persisted.
pub type EntityId = i64;

/// Identifier of an authenticated principal, as carried in credential claims.
pub type ActorId = i64;

pub type CourseId = EntityId;
pub type LessonId = EntityId;
pub type AssignmentId = EntityId;
pub type EnrollmentId = EntityId;
pub type SubmissionId = EntityId;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
