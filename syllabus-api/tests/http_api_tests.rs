//! Router-level tests for the REST surface.
//!
//! Every request goes through the real middleware stack: principal
//! resolution, handlers, services, cache and in-memory store.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::TestApp;
use syllabus_api::ApiConfig;
use syllabus_api::Environment;
use syllabus_core::Actor;

const INSTRUCTOR: i64 = 2;
const OTHER_INSTRUCTOR: i64 = 5;
const LEARNER: i64 = 3;

async fn create_course(app: &TestApp, slug: &str, category: &str) -> i64 {
    let auth = app.bearer(Actor::instructor(INSTRUCTOR));
    let response = app
        .post(
            "/api/v1/courses",
            Some(&auth),
            json!({ "title": format!("Course {slug}"), "slug": slug, "category": category }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_i64().expect("course id")
}

// ============================================================================
// AUTHENTICATION
// ============================================================================

#[tokio::test]
async fn anonymous_catalogue_listing_is_allowed() {
    let app = TestApp::new();
    create_course(&app, "rust-basics", "Programming").await;

    let response = app.get("/api/v1/courses", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().map(Vec::len), Some(1));
    assert_eq!(response.body[0]["slug"], "rust-basics");
    assert_eq!(response.body[0]["enrollment_count"], 0);
}

#[tokio::test]
async fn anonymous_write_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .post(
            "/api/v1/courses",
            None,
            json!({ "title": "Sneaky", "slug": "sneaky", "category": "Misc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("UNAUTHORIZED"));
}

#[tokio::test]
async fn expired_token_is_rejected_even_on_public_routes() {
    let app = TestApp::new();
    let auth = app.bearer(Actor::learner(LEARNER));

    app.clock.advance(std::time::Duration::from_secs(2 * 3600));

    let response = app.get("/api/v1/courses", Some(&auth)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("TOKEN_EXPIRED"));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = TestApp::new();
    let token = app.token(Actor::learner(LEARNER));
    // Flip a signature character that carries only data bits.
    let at = token.len() - 5;
    let replacement = if &token[at..at + 1] == "a" { "b" } else { "a" };
    let token = format!("{}{}{}", &token[..at], replacement, &token[at + 1..]);

    let response = app
        .get("/api/v1/auth/me", Some(&format!("Bearer {token}")))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("INVALID_TOKEN"));
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/courses", Some("Basic dXNlcjpwYXNz"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("INVALID_TOKEN"));
}

#[tokio::test]
async fn me_echoes_the_resolved_actor() {
    let app = TestApp::new();
    let auth = app.bearer(Actor::instructor(INSTRUCTOR));

    let response = app.get("/api/v1/auth/me", Some(&auth)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "id": INSTRUCTOR, "role": "instructor" }));

    let anonymous = app.get("/api/v1/auth/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dev_token_is_usable_outside_production() {
    let app = TestApp::new();
    let response = app
        .post(
            "/api/v1/auth/dev/token",
            None,
            json!({ "actor_id": 7, "role": "learner" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");

    let token = response.body["access_token"].as_str().expect("token string");
    let me = app
        .get("/api/v1/auth/me", Some(&format!("Bearer {token}")))
        .await;
    assert_eq!(me.body, json!({ "id": 7, "role": "learner" }));
}

#[tokio::test]
async fn dev_token_route_absent_in_production() {
    let app = TestApp::with_api_config(ApiConfig {
        environment: Environment::Production,
        cors_origins: vec!["https://lms.example.com".to_string()],
        ..ApiConfig::default()
    });
    let response = app
        .post(
            "/api/v1/auth/dev/token",
            None,
            json!({ "actor_id": 1, "role": "admin" }),
        )
        .await;
    assert!(
        matches!(
            response.status,
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
        ),
        "unexpected status {}",
        response.status
    );
}

// ============================================================================
// CACHE HEADERS AND INVALIDATION
// ============================================================================

#[tokio::test]
async fn list_reports_miss_then_hit_then_miss_after_write() {
    let app = TestApp::new();
    create_course(&app, "intro-sql", "Data").await;

    let first = app.get("/api/v1/courses?category=Data", None).await;
    let second = app.get("/api/v1/courses?category=Data", None).await;
    assert_eq!(first.cache_status(), Some("MISS"));
    assert_eq!(second.cache_status(), Some("HIT"));
    assert_eq!(first.body, second.body);

    create_course(&app, "advanced-sql", "Data").await;

    let third = app.get("/api/v1/courses?category=Data", None).await;
    assert_eq!(third.cache_status(), Some("MISS"));
    assert_eq!(third.body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn enrollment_refreshes_course_detail_count() {
    let app = TestApp::new();
    let course_id = create_course(&app, "graph-theory", "Math").await;
    let detail_uri = format!("/api/v1/courses/{course_id}");

    let before = app.get(&detail_uri, None).await;
    assert_eq!(before.body["enrollment_count"], 0);
    assert_eq!(app.get(&detail_uri, None).await.cache_status(), Some("HIT"));

    let learner = app.bearer(Actor::learner(LEARNER));
    let enrolled = app
        .post("/api/v1/enrollments", Some(&learner), json!({ "course_id": course_id }))
        .await;
    assert_eq!(enrolled.status, StatusCode::CREATED);

    let after = app.get(&detail_uri, None).await;
    assert_eq!(after.cache_status(), Some("MISS"));
    assert_eq!(after.body["enrollment_count"], 1);
}

#[tokio::test]
async fn denied_read_does_not_populate_cache() {
    let app = TestApp::new();
    let course_id = create_course(&app, "private-notes", "Misc").await;
    let owner = app.bearer(Actor::instructor(INSTRUCTOR));
    let draft = app
        .post(
            "/api/v1/lessons",
            Some(&owner),
            json!({ "course_id": course_id, "title": "Draft", "slug": "draft", "is_published": false }),
        )
        .await;
    assert_eq!(draft.status, StatusCode::CREATED);
    let lesson_uri = format!("/api/v1/lessons/{}", draft.body["id"]);

    let entries_before = app.cache.len();
    let learner = app.bearer(Actor::learner(LEARNER));
    let denied = app.get(&lesson_uri, Some(&learner)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(app.cache.len(), entries_before);

    let owned = app.get(&lesson_uri, Some(&owner)).await;
    assert_eq!(owned.status, StatusCode::OK);
    assert_eq!(owned.cache_status(), Some("MISS"));
}

// ============================================================================
// AUTHORIZATION AND ERRORS
// ============================================================================

#[tokio::test]
async fn second_enrollment_conflicts() {
    let app = TestApp::new();
    let course_id = create_course(&app, "linear-algebra", "Math").await;
    let learner = app.bearer(Actor::learner(LEARNER));
    let body = json!({ "course_id": course_id });

    let first = app.post("/api/v1/enrollments", Some(&learner), body.clone()).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post("/api/v1/enrollments", Some(&learner), body).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), Some("ALREADY_ENROLLED"));

    let mine = app.get("/api/v1/enrollments/my", Some(&learner)).await;
    assert_eq!(mine.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete_course() {
    let app = TestApp::new();
    let course_id = create_course(&app, "compilers", "Programming").await;
    let uri = format!("/api/v1/courses/{course_id}");
    let intruder = app.bearer(Actor::instructor(OTHER_INSTRUCTOR));

    let update = app
        .put(&uri, Some(&intruder), json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);

    let delete = app.delete(&uri, Some(&intruder)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let admin = app.bearer(Actor::admin(1));
    let removed = app.delete(&uri, Some(&admin)).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_flow_with_grading() {
    let app = TestApp::new();
    let course_id = create_course(&app, "algorithms", "Programming").await;
    let owner = app.bearer(Actor::instructor(INSTRUCTOR));
    let learner = app.bearer(Actor::learner(LEARNER));

    let assignment = app
        .post(
            "/api/v1/assignments",
            Some(&owner),
            json!({
                "course_id": course_id,
                "title": "Sorting",
                "due_date": "2024-01-08T09:00:00Z",
            }),
        )
        .await;
    assert_eq!(assignment.status, StatusCode::CREATED, "{}", assignment.body);
    let assignment_id = assignment.body["id"].as_i64().expect("assignment id");

    let not_enrolled = app
        .post(
            "/api/v1/submissions",
            Some(&learner),
            json!({ "assignment_id": assignment_id, "content": "quicksort" }),
        )
        .await;
    assert_eq!(not_enrolled.status, StatusCode::FORBIDDEN);

    app.post("/api/v1/enrollments", Some(&learner), json!({ "course_id": course_id }))
        .await;
    let submitted = app
        .post(
            "/api/v1/submissions",
            Some(&learner),
            json!({ "assignment_id": assignment_id, "content": "quicksort" }),
        )
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED, "{}", submitted.body);
    assert_eq!(submitted.body["is_late"], false);
    let submission_id = submitted.body["id"].as_i64().expect("submission id");

    let graded = app
        .post(
            &format!("/api/v1/submissions/{submission_id}/grade"),
            Some(&owner),
            json!({ "score": 92.0, "feedback": "Nice" }),
        )
        .await;
    assert_eq!(graded.status, StatusCode::OK, "{}", graded.body);

    let average = app
        .get(
            &format!("/api/v1/assignments/{assignment_id}/average-score"),
            Some(&owner),
        )
        .await;
    assert_eq!(average.body["average_score"], 92.0);
}

#[tokio::test]
async fn invalid_path_id_is_a_bad_request() {
    let app = TestApp::new();
    let response = app.get("/api/v1/courses/not-a-number", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// OPERATIONAL ROUTES
// ============================================================================

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = TestApp::new();

    let ping = app.get("/health/ping", None).await;
    assert_eq!(ping.status, StatusCode::OK);

    let ready = app.get("/health", None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "healthy");

    let doc = app.get("/openapi.json", None).await;
    assert_eq!(doc.status, StatusCode::OK);
    assert!(doc.body["paths"].get("/api/v1/courses").is_some());
}
