//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::{get, patch};

pub use dto::{CreateTaskRequest, ListTasksQuery, TaskResponse, UpdateTaskRequest};
pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use handlers::{
    AppState, HealthResponse, complete_task, create_task, delete_task, get_completed_tasks,
    get_pending_tasks, get_task, get_tasks, health_check, uncomplete_task, update_task,
};

/// Builds the application router.
///
/// The static `/tasks/completed` and `/tasks/pending` segments take
/// precedence over the `/tasks/{id}` capture.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(get_tasks).post(create_task))
        .route("/tasks/completed", get(get_completed_tasks))
        .route("/tasks/pending", get(get_pending_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/complete", patch(complete_task))
        .route("/tasks/{id}/uncomplete", patch(uncomplete_task))
        .with_state(state)
}
