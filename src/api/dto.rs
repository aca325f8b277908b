//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are kept separate from the domain model so the wire contract can
//! evolve independently.

use serde::{Deserialize, Serialize};

use crate::domain::Task;
use crate::infrastructure::Pagination;

// =============================================================================
// Task DTOs
// =============================================================================

/// Request DTO for creating a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Name of the task.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Request DTO for replacing a task.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    /// New name.
    pub name: String,
    /// New description; absent or empty clears it.
    #[serde(default)]
    pub description: Option<String>,
    /// New completion flag.
    #[serde(default)]
    pub completed: bool,
}

/// Response DTO for a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    /// Task ID.
    pub id: i32,
    /// Name of the task.
    pub name: String,
    /// Description, empty when none was given.
    pub description: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.value(),
            name: task.name.clone(),
            description: task.description.clone().unwrap_or_default(),
            completed: task.completed,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

/// Converts a list of tasks into response DTOs.
#[must_use]
pub fn task_responses(tasks: Vec<Task>) -> Vec<TaskResponse> {
    tasks.into_iter().map(TaskResponse::from).collect()
}

// =============================================================================
// Query DTOs
// =============================================================================

/// Query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Items per page (default: 50, range: 1-100).
    pub limit: Option<u32>,
    /// Items to skip (default: 0).
    pub offset: Option<u64>,
}

impl From<ListTasksQuery> for Pagination {
    fn from(query: ListTasksQuery) -> Self {
        Self::from_query(query.limit, query.offset)
    }
}

// =============================================================================
// Tests
// =============================================================================
