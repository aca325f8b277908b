//! Integration tests for the task endpoints.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`,
//! so routing, extractor rejections and status mapping are all covered.

mod common;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use common::{
    create_and_save_task, create_test_app_state, create_test_app_state_with_policy,
    create_test_router, json_body, send, send_json,
};
use todo_service::api::router;
use todo_service::domain::ValidationPolicy;

// =============================================================================
// GET /health Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health_check() {
    let state = create_test_app_state();
    create_and_save_task(&state, "Counted").await;
    let application = router(state);

    let body = json_body(send(&application, "GET", "/health").await, StatusCode::OK).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "todo-api");
    assert_eq!(body["task_count"], 1);
}

// =============================================================================
// Task Lifecycle Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_update_and_filter_by_status() {
    let application = create_test_router();

    let created = json_body(
        send_json(
            &application,
            "POST",
            "/tasks",
            r#"{"name":"Buy milk","description":"2%"}"#,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["completed"], false);
    assert_eq!(created["description"], "2%");

    let updated = json_body(
        send_json(
            &application,
            "PUT",
            "/tasks/1",
            r#"{"name":"Buy milk","description":"whole","completed":true}"#,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["description"], "whole");
    assert_eq!(updated["created_at"], created["created_at"]);

    let pending = json_body(send(&application, "GET", "/tasks/pending").await, StatusCode::OK).await;
    assert_eq!(pending, json!([]));

    let completed =
        json_body(send(&application, "GET", "/tasks/completed").await, StatusCode::OK).await;
    let completed = completed.as_array().expect("array");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], 1);
}

#[rstest]
#[tokio::test]
async fn test_update_missing_task_returns_not_found() {
    let application = create_test_router();

    let body = json_body(
        send_json(
            &application,
            "PUT",
            "/tasks/999",
            r#"{"name":"x","description":"y","completed":false}"#,
        )
        .await,
        StatusCode::NOT_FOUND,
    )
    .await;

    assert_eq!(body["code"], "TASK_NOT_FOUND");
}

#[rstest]
#[tokio::test]
async fn test_create_with_empty_name_is_rejected_and_not_stored() {
    let application = create_test_router();

    let body = json_body(
        send_json(&application, "POST", "/tasks", r#"{"name":"","description":"desc"}"#).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "name");

    let all = json_body(send(&application, "GET", "/tasks").await, StatusCode::OK).await;
    assert_eq!(all, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_create_with_too_long_name_is_rejected() {
    let application = create_test_router();
    let payload = json!({ "name": "a".repeat(256) }).to_string();

    let body = json_body(
        send_json(&application, "POST", "/tasks", payload).await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[rstest]
#[tokio::test]
async fn test_strict_policy_rejects_missing_description() {
    let application = router(create_test_app_state_with_policy(ValidationPolicy::Strict));

    let body = json_body(
        send_json(&application, "POST", "/tasks", r#"{"name":"Task"}"#).await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(body["details"][0]["field"], "description");
}

#[rstest]
#[tokio::test]
async fn test_strict_policy_rejects_whitespace_description() {
    let application = router(create_test_app_state_with_policy(ValidationPolicy::Strict));

    let body = json_body(
        send_json(
            &application,
            "POST",
            "/tasks",
            r#"{"name":"Task","description":"   "}"#,
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "description");
}

#[rstest]
#[tokio::test]
async fn test_get_and_delete_task() {
    let state = create_test_app_state();
    let task = create_and_save_task(&state, "Walk the dog").await;
    let application = router(state);
    let uri = format!("/tasks/{}", task.id);

    let body = json_body(send(&application, "GET", &uri).await, StatusCode::OK).await;
    assert_eq!(body["name"], "Walk the dog");

    let response = send(&application, "DELETE", &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&application, "GET", &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&application, "DELETE", &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_complete_is_idempotent_and_uncomplete_reverts() {
    let state = create_test_app_state();
    let task = create_and_save_task(&state, "Task").await;
    let application = router(state);
    let complete_uri = format!("/tasks/{}/complete", task.id);

    for _ in 0..2 {
        let body = json_body(
            send(&application, "PATCH", &complete_uri).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["completed"], true);
    }

    let body = json_body(
        send(&application, "PATCH", &format!("/tasks/{}/uncomplete", task.id)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["completed"], false);
}

#[rstest]
#[tokio::test]
async fn test_complete_missing_task_returns_not_found() {
    let application = create_test_router();

    let response = send(&application, "PATCH", "/tasks/7/complete").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Pagination Tests
// =============================================================================

#[rstest]
#[case("/tasks?limit=2", vec![1, 2])]
#[case("/tasks?limit=2&offset=3", vec![4, 5])]
#[case("/tasks?offset=10", vec![])]
#[case("/tasks?limit=0", vec![1])]
#[tokio::test]
async fn test_list_pagination(#[case] uri: &str, #[case] expected: Vec<i64>) {
    let state = create_test_app_state();
    for index in 0..5 {
        create_and_save_task(&state, &format!("Task {index}")).await;
    }
    let application = router(state);

    let body = json_body(send(&application, "GET", uri).await, StatusCode::OK).await;
    let ids: Vec<i64> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|task| task["id"].as_i64())
        .collect();

    assert_eq!(ids, expected);
}

// =============================================================================
// Malformed Request Tests
// =============================================================================

#[rstest]
#[case("POST", "/tasks", "{not json")]
#[case("POST", "/tasks", r#"{"description":"missing name"}"#)]
#[case("PUT", "/tasks/1", "[]")]
#[tokio::test]
async fn test_malformed_body_returns_invalid_request(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] payload: &str,
) {
    let application = create_test_router();

    let body = json_body(
        send_json(&application, method, uri, payload).await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[rstest]
#[case("/tasks/abc")]
#[case("/tasks?limit=many")]
#[tokio::test]
async fn test_malformed_path_or_query_returns_bad_request(#[case] uri: &str) {
    let application = create_test_router();

    let body = json_body(send(&application, "GET", uri).await, StatusCode::BAD_REQUEST).await;

    assert_eq!(body["code"], "INVALID_REQUEST");
}
