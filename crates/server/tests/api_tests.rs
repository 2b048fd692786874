//! Integration tests for the public catalog endpoints.

mod common;

use axum::http::StatusCode;
use common::TestServer;
use common::fixtures::{create_user, seed_course};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn health_check_works_unauthenticated() {
    let server = TestServer::new().await;

    let (status, body) = server.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn list_courses_anonymous_hides_inactive() {
    let server = TestServer::new().await;
    let (_active, _) = seed_course(&server, "Visible Course", "Testing", 2).await;
    let (hidden, _) = seed_course(&server, "Hidden Course", "Testing", 1).await;
    server
        .metadata()
        .set_course_active(hidden.course_id, false, time::OffsetDateTime::now_utc())
        .await
        .unwrap();

    let (status, body) = server.request("GET", "/api/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Visible Course");
    // Anonymous callers see no enrollment overlay.
    assert!(courses[0].get("is_enrolled").is_none());
}

#[tokio::test]
async fn list_courses_authenticated_includes_enrollment_state() {
    let server = TestServer::new().await;
    let (course, _) = seed_course(&server, "Rust Basics", "Development", 2).await;
    seed_course(&server, "Other Course", "Development", 1).await;
    let (user, token) = create_user(&server, "alice", false).await;

    server
        .metadata()
        .enroll(user.user_id, course.course_id, time::OffsetDateTime::now_utc())
        .await
        .unwrap();

    let (status, body) = server
        .request("GET", "/api/courses", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    for c in courses {
        if c["title"] == "Rust Basics" {
            assert_eq!(c["is_enrolled"], true);
            assert_eq!(c["completion_percentage"], 0.0);
        } else {
            assert_eq!(c["is_enrolled"], false);
            assert!(c.get("completion_percentage").is_none());
        }
    }
}

#[tokio::test]
async fn get_course_returns_ordered_hierarchy() {
    let server = TestServer::new().await;
    let (course, videos) = seed_course(&server, "Structured Course", "Testing", 3).await;

    let uri = format!("/api/courses/{}", course.course_id);
    let (status, body) = server.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["course"]["title"], "Structured Course");
    assert_eq!(body["enrolled"], false);

    let stages = body["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 1);
    let listed = stages[0]["videos"].as_array().unwrap();
    assert_eq!(listed.len(), videos.len());
    for (i, v) in listed.iter().enumerate() {
        assert_eq!(v["order_index"], (i + 1) as i64);
        // Anonymous callers see no progress overlay.
        assert!(v.get("progress").is_none());
    }
}

#[tokio::test]
async fn get_course_overlays_progress_for_enrolled_caller() {
    let server = TestServer::new().await;
    let (course, videos) = seed_course(&server, "Progress Course", "Testing", 2).await;
    let (user, token) = create_user(&server, "alice", false).await;

    let now = time::OffsetDateTime::now_utc();
    server
        .metadata()
        .enroll(user.user_id, course.course_id, now)
        .await
        .unwrap();
    server
        .metadata()
        .record_video_progress(user.user_id, videos[0].video_id, 600, 100.0, true, now)
        .await
        .unwrap();

    let uri = format!("/api/courses/{}", course.course_id);
    let (status, body) = server.request("GET", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["enrolled"], true);
    assert_eq!(body["enrollment"]["completion_percentage"], 50.0);

    let listed = body["stages"][0]["videos"].as_array().unwrap();
    assert_eq!(listed[0]["progress"]["completed"], true);
    assert_eq!(listed[0]["progress"]["progress_percent"], 100.0);
    // The untouched video reads as zero progress.
    assert_eq!(listed[1]["progress"]["completed"], false);
    assert_eq!(listed[1]["progress"]["watched_seconds"], 0);
    assert!(listed[1]["progress"]["last_watched"].is_null());
}

#[tokio::test]
async fn get_course_unknown_or_inactive_is_404() {
    let server = TestServer::new().await;

    let uri = format!("/api/courses/{}", Uuid::new_v4());
    let (status, body) = server.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (course, _) = seed_course(&server, "Soon Hidden", "Testing", 1).await;
    server
        .metadata()
        .set_course_active(course.course_id, false, time::OffsetDateTime::now_utc())
        .await
        .unwrap();
    let uri = format!("/api/courses/{}", course.course_id);
    let (status, _) = server.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_are_distinct_and_sorted() {
    let server = TestServer::new().await;
    seed_course(&server, "Course A", "Writing", 1).await;
    seed_course(&server, "Course B", "Development", 1).await;
    seed_course(&server, "Course C", "Development", 1).await;

    let (status, body) = server.request("GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        json!(["Development", "Writing"])
    );
}

#[tokio::test]
async fn responses_echo_the_trace_id() {
    let server = TestServer::new().await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/health")
        .header("x-trace-id", "corr-1234")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(server.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-trace-id"], "corr-1234");

    // Without a client-provided value a generated ID comes back.
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(server.router.clone(), request)
        .await
        .unwrap();
    assert!(!response.headers()["x-trace-id"].is_empty());
}

#[tokio::test]
async fn invalid_token_reads_as_anonymous() {
    let server = TestServer::new().await;
    seed_course(&server, "Open Course", "Testing", 1).await;

    let (status, body) = server
        .request("GET", "/api/courses", None, Some("not-a-valid-jwt"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let courses = body["courses"].as_array().unwrap();
    assert!(courses[0].get("is_enrolled").is_none());
}
