//! In-memory repository implementation.
//!
//! Tasks live in a `BTreeMap` keyed by id next to a monotonic id counter.
//! Both sit behind a single `tokio::sync::RwLock`, so mutations are
//! serialized and ids are never handed out twice.
//!
//! Suitable for development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::logging::{SharedLogger, TracingLogger};
use crate::infrastructure::{Pagination, RepositoryError, RepositoryResult, TaskRepository};

#[derive(Debug)]
struct TaskTable {
    tasks: BTreeMap<TaskId, Task>,
    // `None` once `i32::MAX` has been handed out.
    next_id: Option<TaskId>,
}

impl TaskTable {
    const fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: Some(TaskId::new(1)),
        }
    }

    fn allocate_id(&mut self) -> RepositoryResult<TaskId> {
        let id = self.next_id.ok_or(RepositoryError::IdSpaceExhausted)?;
        self.next_id = id.next();
        Ok(id)
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use todo_service::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let stored = repository.create(candidate).await?;
/// let found = repository.get_by_id(stored.id).await?;
/// ```
#[derive(Clone)]
pub struct InMemoryTaskRepository {
    table: Arc<RwLock<TaskTable>>,
    logger: SharedLogger,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository that logs through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_logger(TracingLogger::shared("in_memory_task_repository"))
    }

    /// Creates an empty repository with an injected logger.
    #[must_use]
    pub fn with_logger(logger: SharedLogger) -> Self {
        Self {
            table: Arc::new(RwLock::new(TaskTable::new())),
            logger,
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTaskRepository {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("InMemoryTaskRepository")
            .field("table", &self.table)
            .field("logger", &"Arc<dyn OperationLogger>")
            .finish()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn get_all(&self, pagination: Pagination) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug("Getting all tasks");
            let guard = table.read().await;
            let tasks: Vec<Task> = pagination.apply(guard.tasks.values().cloned()).collect();
            logger.info(&format!("Retrieved {} tasks", tasks.len()));
            Ok(tasks)
        }
        .boxed()
    }

    fn get_by_id(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Getting task by ID: {id}"));
            let found = table.read().await.tasks.get(&id).cloned();
            match &found {
                Some(task) => logger.info(&format!("Task found: {}", task.name)),
                None => logger.warn(&format!("Task not found with ID: {id}")),
            }
            Ok(found)
        }
        .boxed()
    }

    fn create(&self, task: Task) -> BoxFuture<'static, RepositoryResult<Task>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Creating task: {}", task.name));
            let mut guard = table.write().await;
            let id = match guard.allocate_id() {
                Ok(id) => id,
                Err(error) => {
                    logger.error(&format!("Error creating task: {error}"));
                    return Err(error);
                }
            };
            let now = Timestamp::now();
            let stored = Task {
                id,
                created_at: now,
                updated_at: now,
                ..task
            };
            guard.tasks.insert(id, stored.clone());
            logger.info(&format!("Task created with ID: {id}"));
            Ok(stored)
        }
        .boxed()
    }

    fn update(&self, id: TaskId, task: Task) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Updating task with ID: {id}"));
            let mut guard = table.write().await;
            let Some(existing) = guard.tasks.get_mut(&id) else {
                logger.warn(&format!("Task not found for update with ID: {id}"));
                return Ok(None);
            };

            existing.name = task.name;
            existing.description = task.description;
            existing.completed = task.completed;
            existing.updated_at = Timestamp::now();

            let updated = existing.clone();
            logger.info(&format!("Task updated: {}", updated.name));
            Ok(Some(updated))
        }
        .boxed()
    }

    fn set_completed(
        &self,
        id: TaskId,
        completed: bool,
    ) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Setting completed={completed} on task with ID: {id}"));
            let mut guard = table.write().await;
            let Some(existing) = guard.tasks.get_mut(&id) else {
                logger.warn(&format!("Task not found for completion with ID: {id}"));
                return Ok(None);
            };

            if existing.completed != completed {
                existing.completed = completed;
                existing.updated_at = Timestamp::now();
            }

            let updated = existing.clone();
            logger.info(&format!("Task {id} completed={completed}"));
            Ok(Some(updated))
        }
        .boxed()
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Deleting task with ID: {id}"));
            let removed = table.write().await.tasks.remove(&id).is_some();
            if removed {
                logger.info(&format!("Task deleted with ID: {id}"));
            } else {
                logger.warn(&format!("Task not found for deletion with ID: {id}"));
            }
            Ok(removed)
        }
        .boxed()
    }

    fn get_by_status(
        &self,
        completed: bool,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let table = Arc::clone(&self.table);
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Getting tasks with completed={completed}"));
            let guard = table.read().await;
            let matching = guard
                .tasks
                .values()
                .filter(|task| task.completed == completed)
                .cloned();
            let tasks: Vec<Task> = pagination.apply(matching).collect();
            logger.info(&format!(
                "Retrieved {} tasks with completed={completed}",
                tasks.len()
            ));
            Ok(tasks)
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let table = Arc::clone(&self.table);
        async move {
            let guard = table.read().await;
            Ok(guard.tasks.len() as u64)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::{LogLevel, OperationLogger};
    use rstest::rstest;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingLogger {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl OperationLogger for CapturingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }

    fn candidate(name: &str) -> Task {
        Task::new(TaskId::UNASSIGNED, name, Timestamp::now())
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repository = InMemoryTaskRepository::new();

        let first = repository.create(candidate("First")).await.unwrap();
        let second = repository.create(candidate("Second")).await.unwrap();

        assert_eq!(first.id, TaskId::new(1));
        assert_eq!(second.id, TaskId::new(2));
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_ignores_candidate_id() {
        let repository = InMemoryTaskRepository::new();
        let stored = repository
            .create(candidate("Task").with_id(TaskId::new(99)))
            .await
            .unwrap();
        assert_eq!(stored.id, TaskId::new(1));
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_then_get_returns_equal_task() {
        let repository = InMemoryTaskRepository::new();
        let stored = repository
            .create(candidate("Buy milk").with_description("2%"))
            .await
            .unwrap();

        let found = repository.get_by_id(stored.id).await.unwrap();
        assert_eq!(found, Some(stored));
    }

    #[rstest]
    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repository = InMemoryTaskRepository::new();
        let first = repository.create(candidate("First")).await.unwrap();
        assert!(repository.delete(first.id).await.unwrap());

        let second = repository.create(candidate("Second")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.id, TaskId::new(2));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_preserves_id_and_created_at() {
        let repository = InMemoryTaskRepository::new();
        let stored = repository.create(candidate("Old")).await.unwrap();

        let replacement = candidate("New").with_completed(true).with_id(TaskId::new(42));
        let updated = repository
            .update(stored.id, replacement)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.name, "New");
        assert!(updated.completed);
        assert!(updated.updated_at >= stored.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repository = InMemoryTaskRepository::new();
        let result = repository
            .update(TaskId::new(999), candidate("x"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_completed_changes_only_the_flag() {
        let repository = InMemoryTaskRepository::new();
        let stored = repository
            .create(candidate("Task").with_description("details"))
            .await
            .unwrap();

        let completed = repository
            .set_completed(stored.id, true)
            .await
            .unwrap()
            .unwrap();

        assert!(completed.completed);
        assert_eq!(completed.name, stored.name);
        assert_eq!(completed.description, stored.description);
        assert_eq!(completed.created_at, stored.created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_completed_without_change_keeps_updated_at() {
        let repository = InMemoryTaskRepository::new();
        let stored = repository.create(candidate("Task")).await.unwrap();

        let unchanged = repository
            .set_completed(stored.id, false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(unchanged, stored);
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_completed_missing_returns_none() {
        let repository = InMemoryTaskRepository::new();
        let result = repository.set_completed(TaskId::new(3), true).await.unwrap();
        assert!(result.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_fails_once_id_space_is_exhausted() {
        let repository = InMemoryTaskRepository::new();
        repository.table.write().await.next_id = Some(TaskId::new(i32::MAX));

        let last = repository.create(candidate("Last")).await.unwrap();
        let overflow = repository.create(candidate("Overflow")).await;

        assert_eq!(last.id, TaskId::new(i32::MAX));
        assert_eq!(overflow, Err(RepositoryError::IdSpaceExhausted));
        assert_eq!(repository.count().await.unwrap(), 1);
        let kept = repository.get_by_id(last.id).await.unwrap().unwrap();
        assert_eq!(kept.name, "Last");
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let repository = InMemoryTaskRepository::new();
        assert!(!repository.delete(TaskId::new(1)).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_all_is_ordered_and_paginated() {
        let repository = InMemoryTaskRepository::new();
        for index in 0..5 {
            repository
                .create(candidate(&format!("Task {index}")))
                .await
                .unwrap();
        }

        let page = repository.get_all(Pagination::new(2, 1)).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|task| task.id.value()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(repository.count().await.unwrap(), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_by_status_filters() {
        let repository = InMemoryTaskRepository::new();
        repository.create(candidate("Pending")).await.unwrap();
        repository
            .create(candidate("Done").with_completed(true))
            .await
            .unwrap();

        let completed = repository
            .get_by_status(true, Pagination::all())
            .await
            .unwrap();
        let pending = repository
            .get_by_status(false, Pagination::all())
            .await
            .unwrap();

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].name, "Done");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "Pending");
    }

    #[rstest]
    #[tokio::test]
    async fn test_operations_report_through_injected_logger() {
        let logger = Arc::new(CapturingLogger::default());
        let repository = InMemoryTaskRepository::with_logger(logger.clone());

        repository.create(candidate("Logged")).await.unwrap();
        repository.get_by_id(TaskId::new(77)).await.unwrap();

        let lines = logger.lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|(level, message)| *level == LogLevel::Info
                && message == "Task created with ID: 1"));
        assert!(lines
            .iter()
            .any(|(level, message)| *level == LogLevel::Warn
                && message == "Task not found with ID: 77"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let repository = InMemoryTaskRepository::new();

        let handles: Vec<_> = (0..32)
            .map(|index| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .create(candidate(&format!("Task {index}")))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }
}
