//! Submission REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use syllabus_core::Submission;

use super::cached;
use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    middleware::CurrentActor,
    services::SubmissionService,
    state::AppState,
    types::{GradeRequest, SubmitRequest},
};

/// POST /api/v1/submissions - Submit work for an assignment
#[utoipa::path(
    post,
    path = "/api/v1/submissions",
    tag = "Submissions",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Submission received", body = Submission),
        (status = 400, description = "Invalid or duplicate submission", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not enrolled in the course", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit(
    State(submissions): State<SubmissionService>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<impl IntoResponse> {
    let submission = submissions.submit(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/v1/submissions/my - The caller's submissions
#[utoipa::path(
    get,
    path = "/api/v1/submissions/my",
    tag = "Submissions",
    responses(
        (status = 200, description = "Own submissions", body = Vec<Submission>),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_submissions(
    State(submissions): State<SubmissionService>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<impl IntoResponse> {
    let read = submissions.list_mine(&actor).await?;
    Ok(cached(read))
}

/// GET /api/v1/submissions/{id} - Get a submission
#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    params(("id" = i64, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = Submission),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Neither the submitter nor the course owner", body = ApiError),
        (status = 404, description = "Submission not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_submission(
    State(submissions): State<SubmissionService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = submissions.get(&actor, id).await?;
    Ok(cached(read))
}

/// POST /api/v1/submissions/{id}/grade - Grade a submission
#[utoipa::path(
    post,
    path = "/api/v1/submissions/{id}/grade",
    tag = "Submissions",
    params(("id" = i64, Path, description = "Submission ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Submission graded", body = Submission),
        (status = 400, description = "Score out of range", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Submission not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn grade_submission(
    State(submissions): State<SubmissionService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
    Json(req): Json<GradeRequest>,
) -> ApiResult<impl IntoResponse> {
    let graded = submissions.grade(&actor, id, req).await?;
    Ok(Json(graded))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/my", get(my_submissions))
        .route("/:id", get(get_submission))
        .route("/:id/grade", post(grade_submission))
}
