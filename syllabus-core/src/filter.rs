//! List filters.
//!
//! Every filter can render itself as `(name, value)` pairs. The cache layer
//! builds list keys from those pairs, so a new filter field automatically
//! takes part in key derivation.

use serde::{Deserialize, Serialize};

use crate::{ActorId, Course, CourseLevel};

/// Filter for the public course catalogue. Only active courses are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub instructor_id: Option<ActorId>,
}

impl CourseFilter {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_level(mut self, level: CourseLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_instructor(mut self, instructor_id: ActorId) -> Self {
        self.instructor_id = Some(instructor_id);
        self
    }

    /// Whether `course` belongs in the filtered catalogue.
    pub fn matches(&self, course: &Course) -> bool {
        course.is_active
            && self
                .category
                .as_ref()
                .is_none_or(|category| &course.category == category)
            && self.level.is_none_or(|level| course.level == level)
            && self
                .instructor_id
                .is_none_or(|instructor| course.instructor_id == instructor)
    }

    /// Set parameters as `(name, value)` pairs. Unset fields are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(level) = self.level {
            params.push(("level", level.to_string()));
        }
        if let Some(instructor_id) = self.instructor_id {
            params.push(("instructor_id", instructor_id.to_string()));
        }
        params
    }
}
