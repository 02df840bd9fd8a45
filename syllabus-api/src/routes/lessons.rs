//! Lesson REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use syllabus_core::Lesson;

use super::cached;
use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    middleware::{CurrentActor, OptionalActor},
    services::LessonService,
    state::AppState,
    types::{CreateLessonRequest, UpdateLessonRequest},
};

/// POST /api/v1/lessons - Add a lesson to a course
#[utoipa::path(
    post,
    path = "/api/v1/lessons",
    tag = "Lessons",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Course not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lesson(
    State(lessons): State<LessonService>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    let lesson = lessons.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/v1/lessons/{id} - Get a lesson
#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson", body = Lesson),
        (status = 401, description = "Authentication required", body = ApiError),
        (status = 403, description = "Unpublished lesson", body = ApiError),
        (status = 404, description = "Lesson not found", body = ApiError),
    ),
)]
pub async fn get_lesson(
    State(lessons): State<LessonService>,
    OptionalActor(actor): OptionalActor,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    let read = lessons.get(actor.as_ref(), id).await?;
    Ok(cached(read))
}

/// PUT /api/v1/lessons/{id} - Update a lesson
#[utoipa::path(
    put,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    params(("id" = i64, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Lesson not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_lesson(
    State(lessons): State<LessonService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
    Json(req): Json<UpdateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    let lesson = lessons.update(&actor, id, req).await?;
    Ok(Json(lesson))
}

/// DELETE /api/v1/lessons/{id} - Delete a lesson
#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Not the course owner", body = ApiError),
        (status = 404, description = "Lesson not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_lesson(
    State(lessons): State<LessonService>,
    CurrentActor(actor): CurrentActor,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    lessons.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_lesson))
        .route("/:id", get(get_lesson).put(update_lesson).delete(delete_lesson))
}
