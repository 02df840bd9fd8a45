//! Assignment REST API Routes

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
    middleware::{CurrentActor, OptionalActor},
    services::{AssignmentService, SubmissionService},
    state::AppState,
    types::{
        AssignmentView, AverageScoreResponse, CreateAssignmentRequest, UpdateAssignmentRequest,
    },
};

/// POST /api/v1/assignments - Add an assignment to a course
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    tag = "Assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentView),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_assignment(
    State(assignments): State<AssignmentService>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = assignments.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/assignments/{id} - Get an assignment
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment with overdue flag", body = AssignmentView),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
)]
pub async fn get_assignment(
    State(assignments): State<AssignmentService>,
    OptionalActor(actor): OptionalActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = assignments.get(actor.as_ref(), id).await?;
    Ok(cached(read))
}

/// PUT /api/v1/assignments/{id} - Update an assignment
#[utoipa::path(
    put,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentView),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_assignment(
    State(assignments): State<AssignmentService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
    Json(req): Json<UpdateAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = assignments.update(&actor, id, req).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/assignments/{id} - Delete an assignment and its submissions
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_assignment(
    State(assignments): State<AssignmentService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    assignments.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/assignments/{id}/submissions - All submissions to an assignment
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/submissions",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submissions", body = Vec<Submission>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assignment_submissions(
    State(submissions): State<SubmissionService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = submissions.list_for_assignment(&actor, id).await?;
    Ok(cached(read))
}

/// GET /api/v1/assignments/{id}/average-score - Mean of graded scores
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/average-score",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Average score, null when nothing is graded", body = AverageScoreResponse),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn average_score(
    State(assignments): State<AssignmentService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let response = assignments.average_score(&actor, id).await?;
    Ok(Json(response))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assignment))
        .route(
            "/:id",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        .route("/:id/submissions", get(list_assignment_submissions))
        .route("/:id/average-score", get(average_score))
}
