//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, so helpers used by only one file
//! would otherwise warn in the others.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todo_service::api::{AppState, router};
use todo_service::domain::{Task, ValidationPolicy};
use todo_service::infrastructure::InMemoryTaskRepository;
use todo_service::service::TaskService;

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by an in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::from_service(create_test_service())
}

/// Creates a test `AppState` using the given validation policy.
pub fn create_test_app_state_with_policy(policy: ValidationPolicy) -> AppState {
    AppState::from_service(TaskService::with_policy(
        Arc::new(InMemoryTaskRepository::new()),
        policy,
    ))
}

/// Creates a task service backed by an in-memory repository.
pub fn create_test_service() -> TaskService {
    TaskService::new(Arc::new(InMemoryTaskRepository::new()))
}

/// Creates a router around a fresh in-memory state.
pub fn create_test_router() -> Router {
    router(create_test_app_state())
}

/// Creates and stores a task through the service.
pub async fn create_and_save_task(state: &AppState, name: &str) -> Task {
    state
        .service
        .create_task(name, None)
        .await
        .expect("Failed to create task")
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends a request without a body.
pub async fn send(application: &Router, method: &str, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request");
    application
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible")
}

/// Sends a request with a raw JSON body.
pub async fn send_json(
    application: &Router,
    method: &str,
    uri: &str,
    body: impl Into<String>,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .expect("Failed to build request");
    application
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible")
}

/// Reads the response body as JSON, asserting the expected status first.
pub async fn json_body(response: Response<Body>, expected: StatusCode) -> Value {
    assert_eq!(response.status(), expected);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
