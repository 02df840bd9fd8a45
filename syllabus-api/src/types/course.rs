//! Course-related API types

use serde::{Deserialize, Serialize};
use syllabus_core::{ActorId, CourseLevel, CoursePatch};

use crate::validation::{
    validate_slug, HasUpdates, Validate, ValidateNonEmpty, ValidationResult,
};

fn default_true() -> bool {
    true
}

/// Request to create a new course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCourseRequest {
    pub title: String,
    /// Unique across all courses; lowercase letters, digits and hyphens
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Owning instructor. Only honoured for admins; instructors always own
    /// the courses they create.
    #[serde(default)]
    pub instructor_id: Option<ActorId>,
}

impl Validate for CreateCourseRequest {
    fn validate(&self) -> ValidationResult {
        self.title.validate_non_empty("title")?;
        validate_slug("slug", &self.slug)?;
        self.category.validate_non_empty("category")?;
        Ok(())
    }
}

/// Request to update an existing course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub is_active: Option<bool>,
}

impl HasUpdates for UpdateCourseRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.level.is_some()
            || self.is_active.is_some()
    }
}

impl Validate for UpdateCourseRequest {
    fn validate(&self) -> ValidationResult {
        self.validate_has_updates()?;
        self.title.validate_non_empty("title")?;
        if let Some(slug) = &self.slug {
            validate_slug("slug", slug)?;
        }
        self.category.validate_non_empty("category")?;
        Ok(())
    }
}

impl From<UpdateCourseRequest> for CoursePatch {
    fn from(req: UpdateCourseRequest) -> Self {
        CoursePatch {
            title: req.title,
            slug: req.slug,
            description: req.description,
            category: req.category,
            level: req.level,
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() -> Result<(), serde_json::Error> {
        let req: CreateCourseRequest = serde_json::from_value(serde_json::json!({
            "title": "Python Basics",
            "slug": "python-basics",
            "category": "Programming"
        }))?;
        assert!(req.is_active);
        assert_eq!(req.level, CourseLevel::Beginner);
        assert!(req.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_update_requires_a_field() {
        assert!(UpdateCourseRequest::default().validate().is_err());

        let req = UpdateCourseRequest {
            slug: Some("Bad Slug".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
