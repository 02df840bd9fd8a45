//! OpenAPI Specification for the Syllabus API
//!
//! Generated by utoipa from the DTOs, domain types and route annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{CacheHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{assignments, auth, courses, enrollments, health, lessons, submissions};
use crate::types::*;

use syllabus_core::{
    Actor, Assignment, Course, CourseDetail, CourseFilter, CourseLevel, CourseSummary, Enrollment,
    Lesson, Role, Submission,
};

/// OpenAPI document for the Syllabus API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Syllabus API",
        description = "Course management with role-based access and a read-through cache",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Courses", description = "Course catalogue and course-scoped listings"),
        (name = "Lessons", description = "Ordered lesson content within a course"),
        (name = "Assignments", description = "Graded work with due dates"),
        (name = "Enrollments", description = "Learner membership in courses"),
        (name = "Submissions", description = "Learner work and grading"),
        (name = "Auth", description = "Caller identity and development tokens"),
        (name = "Health", description = "Liveness and readiness")
    ),
    paths(
        // === Course Routes ===
        courses::list_courses,
        courses::get_course,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        courses::list_course_lessons,
        courses::list_course_assignments,

        // === Lesson Routes ===
        lessons::create_lesson,
        lessons::get_lesson,
        lessons::update_lesson,
        lessons::delete_lesson,

        // === Assignment Routes ===
        assignments::create_assignment,
        assignments::get_assignment,
        assignments::update_assignment,
        assignments::delete_assignment,
        assignments::list_assignment_submissions,
        assignments::average_score,

        // === Enrollment Routes ===
        enrollments::enroll,
        enrollments::my_enrollments,
        enrollments::get_enrollment,

        // === Submission Routes ===
        submissions::submit,
        submissions::my_submissions,
        submissions::get_submission,
        submissions::grade_submission,

        // === Auth Routes ===
        auth::me,
        auth::generate_dev_token,

        // === Health Routes ===
        health::ping,
        health::readiness,
    ),
    components(
        schemas(
            ApiError, ErrorCode,

            CreateCourseRequest, UpdateCourseRequest,
            CreateLessonRequest, UpdateLessonRequest,
            CreateAssignmentRequest, UpdateAssignmentRequest, AssignmentView, AverageScoreResponse,
            EnrollRequest,
            SubmitRequest, GradeRequest,
            DevTokenRequest, TokenResponse,

            HealthResponse, HealthStatus, HealthDetails, CacheHealth,

            Actor, Role, CourseLevel, CourseFilter,
            Course, CourseSummary, CourseDetail, Lesson, Assignment, Enrollment, Submission
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Syllabus API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 7);

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("bearer_auth"));
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("Syllabus API"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        assert!(paths.contains_key("/api/v1/courses"));
        assert!(paths.contains_key("/api/v1/courses/{id}"));
        assert!(paths.contains_key("/api/v1/courses/{id}/lessons"));
        assert!(paths.contains_key("/api/v1/assignments/{id}/average-score"));
        assert!(paths.contains_key("/api/v1/enrollments/my"));
        assert!(paths.contains_key("/api/v1/submissions/{id}/grade"));
        assert!(paths.contains_key("/api/v1/auth/me"));
        assert!(paths.contains_key("/health"));
    }

    #[test]
    fn test_entity_timestamps_are_date_time_strings() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| e.to_string())?;
        let doc: serde_json::Value = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        let schemas = &doc["components"]["schemas"];

        for (schema, field) in [
            ("Course", "created_at"),
            ("Assignment", "due_date"),
            ("Enrollment", "enrolled_at"),
            ("Submission", "submitted_at"),
        ] {
            let property = &schemas[schema]["properties"][field];
            assert_eq!(property["type"], "string", "{schema}.{field}");
            assert_eq!(property["format"], "date-time", "{schema}.{field}");
        }
        Ok(())
    }
}
