//! Task service.
//!
//! Builds candidate tasks, validates them under the configured
//! [`ValidationPolicy`], and delegates to the injected [`TaskRepository`].
//! Store-level "no match" results are translated into
//! [`ServiceError::NotFound`] here.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{Task, TaskId, Timestamp, ValidationError, ValidationPolicy};
use crate::infrastructure::{Pagination, RepositoryError, TaskRepository};

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by [`TaskService`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The input violates a validation rule. Nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No task has the given id.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The backing store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Task Service
// =============================================================================

/// Domain operations over tasks.
///
/// Cheap to clone; clones share the same repository.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    policy: ValidationPolicy,
}

impl TaskService {
    /// Creates a service with the default (lenient) validation policy.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self::with_policy(repository, ValidationPolicy::default())
    }

    /// Creates a service with an explicit validation policy.
    #[must_use]
    pub fn with_policy(repository: Arc<dyn TaskRepository>, policy: ValidationPolicy) -> Self {
        Self { repository, policy }
    }

    /// Returns the validation policy in force.
    #[must_use]
    pub const fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Lists tasks within the pagination window.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_all_tasks(&self, pagination: Pagination) -> ServiceResult<Vec<Task>> {
        Ok(self.repository.get_all(pagination).await?)
    }

    /// Fetches a single task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no task has this id.
    pub async fn get_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Creates a pending task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` without touching the store if the
    /// name (or, under the strict policy, the description) is invalid.
    pub async fn create_task(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> ServiceResult<Task> {
        let candidate = Task::new(TaskId::UNASSIGNED, name, Timestamp::now())
            .with_optional_description(description);

        if let Err(error) = candidate.validate_with(self.policy) {
            tracing::debug!(%error, "Rejected task creation");
            return Err(error.into());
        }

        Ok(self.repository.create(candidate).await?)
    }

    /// Replaces name, description and completion flag of a task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the replacement is invalid and
    /// `ServiceError::NotFound` if the id does not exist.
    pub async fn update_task(
        &self,
        id: TaskId,
        name: impl Into<String>,
        description: Option<String>,
        completed: bool,
    ) -> ServiceResult<Task> {
        let replacement = Task::new(id, name, Timestamp::now())
            .with_optional_description(description)
            .with_completed(completed);

        if let Err(error) = replacement.validate_with(self.policy) {
            tracing::debug!(%error, task_id = %id, "Rejected task update");
            return Err(error.into());
        }

        self.repository
            .update(id, replacement)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the id does not exist.
    pub async fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    /// Marks a task as completed. Completing a completed task succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the id does not exist.
    pub async fn complete_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.set_completed(id, true).await
    }

    /// Marks a task as pending. Uncompleting a pending task succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the id does not exist.
    pub async fn uncomplete_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.set_completed(id, false).await
    }

    /// Lists completed tasks.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_completed_tasks(&self, pagination: Pagination) -> ServiceResult<Vec<Task>> {
        Ok(self.repository.get_by_status(true, pagination).await?)
    }

    /// Lists pending tasks.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_pending_tasks(&self, pagination: Pagination) -> ServiceResult<Vec<Task>> {
        Ok(self.repository.get_by_status(false, pagination).await?)
    }

    /// Counts all stored tasks.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn count_tasks(&self) -> ServiceResult<u64> {
        Ok(self.repository.count().await?)
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> ServiceResult<Task> {
        self.repository
            .set_completed(id, completed)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskService")
            .field("repository", &"Arc<dyn TaskRepository>")
            .field("policy", &self.policy)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
