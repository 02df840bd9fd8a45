//! Enum types for Syllabus entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ROLES
// ============================================================================

/// Role carried by an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Learner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Instructor, Role::Learner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Learner => "learner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "admin" => Ok(Role::Admin),
            "instructor" => Ok(Role::Instructor),
            "learner" => Ok(Role::Learner),
            _ => Err(format!("Invalid Role: {}", s)),
        }
    }
}

// ============================================================================
// RESOURCE TYPES
// ============================================================================

/// Resource type discriminator. Also names a cache key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Course,
    Lesson,
    Assignment,
    Submission,
    Enrollment,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Course,
        ResourceType::Lesson,
        ResourceType::Assignment,
        ResourceType::Submission,
        ResourceType::Enrollment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Course => "course",
            ResourceType::Lesson => "lesson",
            ResourceType::Assignment => "assignment",
            ResourceType::Submission => "submission",
            ResourceType::Enrollment => "enrollment",
        }
    }

    /// Course, lesson and assignment are authored content; the other two are
    /// learner records.
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            ResourceType::Course | ResourceType::Lesson | ResourceType::Assignment
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "course" => Ok(ResourceType::Course),
            "lesson" => Ok(ResourceType::Lesson),
            "assignment" => Ok(ResourceType::Assignment),
            "submission" => Ok(ResourceType::Submission),
            "enrollment" => Ok(ResourceType::Enrollment),
            _ => Err(format!("Invalid ResourceType: {}", s)),
        }
    }
}

// ============================================================================
// COURSE LEVEL
// ============================================================================

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            _ => Err(format!("Invalid CourseLevel: {}", s)),
        }
    }
}

fn normalize_token(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
