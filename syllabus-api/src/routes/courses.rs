//! Course REST API Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use syllabus_core::{Course, CourseDetail, CourseFilter, CourseSummary, Lesson};

use super::cached;
use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    middleware::{CurrentActor, OptionalActor},
    services::{AssignmentService, CourseService, LessonService},
    state::AppState,
    types::{AssignmentView, CreateCourseRequest, UpdateCourseRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/courses - List active courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("level" = Option<String>, Query, description = "Filter by level (beginner, intermediate, advanced)"),
        ("instructor_id" = Option<i64>, Query, description = "Filter by owning instructor"),
    ),
    responses(
        (status = 200, description = "Active courses", body = Vec<CourseSummary>),
        (status = 400, description = "Invalid filter", body = ApiError),
        (status = 401, description = "Bad credential", body = ApiError),
    ),
)]
pub async fn list_courses(
    State(courses): State<CourseService>,
    OptionalActor(actor): OptionalActor,
    Query(filter): Query<CourseFilter>,
) -> ApiResult<impl IntoResponse> {
    let read = courses.list(actor.as_ref(), &filter).await?;
    Ok(cached(read))
}

/// GET /api/v1/courses/{id} - Course detail with published lessons
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetail),
        (status = 401, description = "Authentication required", body = ApiError),
        (status = 403, description = "Not visible to the caller", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError),
    ),
)]
pub async fn get_course(
    State(courses): State<CourseService>,
    OptionalActor(actor): OptionalActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = courses.get(actor.as_ref(), id).await?;
    Ok(cached(read))
}

/// POST /api/v1/courses - Create a course
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "Courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Instructor or admin role required", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_course(
    State(courses): State<CourseService>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    let course = courses.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// PUT /api/v1/courses/{id} - Update a course
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the owning instructor", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_course(
    State(courses): State<CourseService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
    Json(req): Json<UpdateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    let course = courses.update(&actor, id, req).await?;
    Ok(Json(course))
}

/// DELETE /api/v1/courses/{id} - Delete a course and everything under it
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the owning instructor", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_course(
    State(courses): State<CourseService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    courses.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/courses/{id}/lessons - Published lessons of a course
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons",
    tag = "Courses",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Published lessons in order", body = Vec<Lesson>),
        (status = 404, description = "Course not found", body = ApiError),
    ),
)]
pub async fn list_course_lessons(
    State(lessons): State<LessonService>,
    OptionalActor(actor): OptionalActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = lessons.list_for_course(actor.as_ref(), id).await?;
    Ok(cached(read))
}

/// GET /api/v1/courses/{id}/assignments - Assignments of a course
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/assignments",
    tag = "Courses",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Assignments by due date", body = Vec<AssignmentView>),
        (status = 404, description = "Course not found", body = ApiError),
    ),
)]
pub async fn list_course_assignments(
    State(assignments): State<AssignmentService>,
    OptionalActor(actor): OptionalActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = assignments.list_for_course(actor.as_ref(), id).await?;
    Ok(cached(read))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
        .route("/:id/lessons", get(list_course_lessons))
        .route("/:id/assignments", get(list_course_assignments))
}
