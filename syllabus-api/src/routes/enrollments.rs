//! Enrollment REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use syllabus_core::Enrollment;

use super::cached;
use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    middleware::CurrentActor,
    services::EnrollmentService,
    state::AppState,
    types::EnrollRequest,
};

/// POST /api/v1/enrollments - Enroll the caller in a course
#[utoipa::path(
    post,
    path = "/api/v1/enrollments",
    tag = "Enrollments",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Learner role required", body = ApiError),
        (status = 404, description = "Course not found or inactive", body = ApiError),
        (status = 409, description = "Already enrolled", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll(
    State(enrollments): State<EnrollmentService>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<EnrollRequest>,
) -> ApiResult<impl IntoResponse> {
    let enrollment = enrollments.enroll(&actor, req.course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// GET /api/v1/enrollments/my - The caller's active enrollments
#[utoipa::path(
    get,
    path = "/api/v1/enrollments/my",
    tag = "Enrollments",
    responses(
        (status = 200, description = "Active enrollments", body = Vec<Enrollment>),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_enrollments(
    State(enrollments): State<EnrollmentService>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<impl IntoResponse> {
    let read = enrollments.list_mine(&actor).await?;
    Ok(cached(read))
}

/// GET /api/v1/enrollments/{id} - Get an enrollment
#[utoipa::path(
    get,
    path = "/api/v1/enrollments/{id}",
    tag = "Enrollments",
    params(("id" = i64, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the enrolled learner", body = ApiError),
        (status = 404, description = "Enrollment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_enrollment(
    State(enrollments): State<EnrollmentService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = enrollments.get(&actor, id).await?;
    Ok(cached(read))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(enroll))
        .route("/my", get(my_enrollments))
        .route("/:id", get(get_enrollment))
}
