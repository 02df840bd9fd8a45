//! API Request and Response Types
//!
//! Request payloads and the few response shapes that are not plain
//! entities. Entities from `syllabus-core` are returned as-is.

// Course types
mod course;
pub use course::*;

// Lesson types
mod lesson;
pub use lesson::*;

// Assignment types
mod assignment;
pub use assignment::*;

// Enrollment types
mod enrollment;
pub use enrollment::*;

// Submission types
mod submission;
pub use submission::*;

// Auth types
mod auth;
pub use auth::*;
