//! Lesson-related API types

use serde::{Deserialize, Serialize};
use syllabus_core::{CourseId, LessonPatch, NewLesson};

use crate::validation::{
    validate_slug, validate_video_url, HasUpdates, Validate, ValidateNonEmpty, ValidationResult,
};

/// Request to create a new lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateLessonRequest {
    pub course_id: CourseId,
    pub title: String,
    /// Unique within the course
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_published: bool,
}

impl Validate for CreateLessonRequest {
    fn validate(&self) -> ValidationResult {
        self.title.validate_non_empty("title")?;
        validate_slug("slug", &self.slug)?;
        if let Some(url) = &self.video_url {
            validate_video_url("video_url", url)?;
        }
        Ok(())
    }
}

impl From<CreateLessonRequest> for NewLesson {
    fn from(req: CreateLessonRequest) -> Self {
        NewLesson {
            course_id: req.course_id,
            title: req.title,
            slug: req.slug,
            description: req.description,
            content: req.content,
            video_url: req.video_url,
            duration_minutes: req.duration_minutes,
            order: req.order,
            is_published: req.is_published,
        }
    }
}

/// Request to update an existing lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    /// An empty string removes the video
    pub video_url: Option<String>,
    pub duration_minutes: Option<u32>,
    pub order: Option<u32>,
    pub is_published: Option<bool>,
}

impl HasUpdates for UpdateLessonRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.description.is_some()
            || self.content.is_some()
            || self.video_url.is_some()
            || self.duration_minutes.is_some()
            || self.order.is_some()
            || self.is_published.is_some()
    }
}

impl Validate for UpdateLessonRequest {
    fn validate(&self) -> ValidationResult {
        self.validate_has_updates()?;
        self.title.validate_non_empty("title")?;
        if let Some(slug) = &self.slug {
            validate_slug("slug", slug)?;
        }
        match self.video_url.as_deref() {
            Some(url) if !url.is_empty() => validate_video_url("video_url", url),
            _ => Ok(()),
        }
    }
}

impl From<UpdateLessonRequest> for LessonPatch {
    fn from(req: UpdateLessonRequest) -> Self {
        LessonPatch {
            title: req.title,
            slug: req.slug,
            description: req.description,
            content: req.content,
            video_url: req
                .video_url
                .map(|url| if url.is_empty() { None } else { Some(url) }),
            duration_minutes: req.duration_minutes,
            order: req.order,
            is_published: req.is_published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_video_url_clears() {
        let patch = LessonPatch::from(UpdateLessonRequest {
            video_url: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(patch.video_url, Some(None));

        let untouched = LessonPatch::from(UpdateLessonRequest {
            order: Some(2),
            ..Default::default()
        });
        assert_eq!(untouched.video_url, None);
    }

    #[test]
    fn test_create_rejects_bad_video_url() {
        let req = CreateLessonRequest {
            course_id: 1,
            title: "Variables".to_string(),
            slug: "variables".to_string(),
            description: String::new(),
            content: String::new(),
            video_url: Some("not a url".to_string()),
            duration_minutes: 10,
            order: 1,
            is_published: true,
        };
        assert!(req.validate().is_err());
    }
}
