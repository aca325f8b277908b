//! HTTP handlers for the task API.
//!
//! Handlers translate requests into `TaskService` calls and map the
//! outcome onto status codes. No business rules live here.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use super::dto::{
    CreateTaskRequest, ListTasksQuery, TaskResponse, UpdateTaskRequest, task_responses,
};
use super::error::ApiErrorResponse;
use crate::domain::TaskId;
use crate::infrastructure::Pagination;
use crate::service::TaskService;

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Task service holding the repository and validation policy.
    pub service: TaskService,
}

impl AppState {
    /// Creates a new `AppState` around a task service.
    #[must_use]
    pub const fn from_service(service: TaskService) -> Self {
        Self { service }
    }
}

type HandlerResult<T> = Result<T, ApiErrorResponse>;

fn task_id(path: Result<Path<i32>, PathRejection>) -> HandlerResult<TaskId> {
    let Path(id) = path?;
    Ok(TaskId::new(id))
}

fn pagination(query: Result<Query<ListTasksQuery>, QueryRejection>) -> HandlerResult<Pagination> {
    let Query(query) = query?;
    Ok(query.into())
}

// =============================================================================
// GET /tasks Handler
// =============================================================================

/// Lists tasks ordered by ID.
///
/// # Query Parameters
///
/// - `limit`: items per page (default 50, clamped to 1-100)
/// - `offset`: items to skip (default 0)
///
/// # Errors
///
/// - **400 Bad Request**: malformed query parameters
/// - **500 Internal Server Error**: store failure
pub async fn get_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> HandlerResult<Json<Vec<TaskResponse>>> {
    let tasks = state.service.get_all_tasks(pagination(query)?).await?;
    Ok(Json(task_responses(tasks)))
}

// =============================================================================
// POST /tasks Handler
// =============================================================================

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Buy milk",
///   "description": "Optional description"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the stored task
///
/// # Errors
///
/// - **400 Bad Request**: malformed JSON or validation failure
/// - **500 Internal Server Error**: store failure
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> HandlerResult<impl IntoResponse> {
    let Json(request) = body?;
    let task = state
        .service
        .create_task(request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

// =============================================================================
// GET /tasks/{id} Handler
// =============================================================================

/// Fetches a single task.
///
/// # Errors
///
/// - **400 Bad Request**: non-numeric ID
/// - **404 Not Found**: unknown ID
/// - **500 Internal Server Error**: store failure
pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> HandlerResult<Json<TaskResponse>> {
    let task = state.service.get_task(task_id(path)?).await?;
    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// PUT /tasks/{id} Handler
// =============================================================================

/// Replaces name, description and completion flag of a task.
///
/// # Errors
///
/// - **400 Bad Request**: non-numeric ID, malformed JSON or validation failure
/// - **404 Not Found**: unknown ID
/// - **500 Internal Server Error**: store failure
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> HandlerResult<Json<TaskResponse>> {
    let id = task_id(path)?;
    let Json(request) = body?;
    let task = state
        .service
        .update_task(id, request.name, request.description, request.completed)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// DELETE /tasks/{id} Handler
// =============================================================================

/// Deletes a task.
///
/// # Response
///
/// - **204 No Content**: the task was removed
///
/// # Errors
///
/// - **404 Not Found**: unknown ID
/// - **500 Internal Server Error**: store failure
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> HandlerResult<StatusCode> {
    state.service.delete_task(task_id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PATCH /tasks/{id}/complete and /tasks/{id}/uncomplete Handlers
// =============================================================================

/// Marks a task as completed. Completing a completed task is a no-op.
///
/// # Errors
///
/// - **404 Not Found**: unknown ID
/// - **500 Internal Server Error**: store failure
pub async fn complete_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> HandlerResult<Json<TaskResponse>> {
    let task = state.service.complete_task(task_id(path)?).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Marks a task as pending.
///
/// # Errors
///
/// - **404 Not Found**: unknown ID
/// - **500 Internal Server Error**: store failure
pub async fn uncomplete_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> HandlerResult<Json<TaskResponse>> {
    let task = state.service.uncomplete_task(task_id(path)?).await?;
    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// GET /tasks/completed and /tasks/pending Handlers
// =============================================================================

/// Lists completed tasks ordered by ID.
///
/// # Errors
///
/// - **500 Internal Server Error**: store failure
pub async fn get_completed_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> HandlerResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .service
        .get_completed_tasks(pagination(query)?)
        .await?;
    Ok(Json(task_responses(tasks)))
}

/// Lists pending tasks ordered by ID.
///
/// # Errors
///
/// - **500 Internal Server Error**: store failure
pub async fn get_pending_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> HandlerResult<Json<Vec<TaskResponse>>> {
    let tasks = state.service.get_pending_tasks(pagination(query)?).await?;
    Ok(Json(task_responses(tasks)))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Response for health check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of stored tasks.
    pub task_count: u64,
}

/// Health check endpoint.
///
/// Counting tasks exercises the store, so a reachable backend is part of
/// a healthy answer.
///
/// # Response
///
/// - **200 OK**: Service and store are reachable
///
/// ```json
/// {
///   "status": "ok",
///   "service": "todo-api",
///   "version": "0.1.0",
///   "task_count": 3
/// }
/// ```
///
/// # Errors
///
/// - **500 Internal Server Error**: store failure
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<Json<HealthResponse>> {
    let task_count = state.service.count_tasks().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        service: "todo-api",
        version: env!("CARGO_PKG_VERSION"),
        task_count,
    }))
}

// =============================================================================
// Tests
// =============================================================================
