//! `PostgreSQL` repository implementation.
//!
//! Every operation is a single parameterized statement; there are no
//! multi-statement transactions and no retries. Failures surface
//! immediately as [`RepositoryError`](crate::infrastructure::RepositoryError).
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id SERIAL PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     description TEXT,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::logging::{SharedLogger, TracingLogger};
use crate::infrastructure::{Pagination, RepositoryError, RepositoryResult, TaskRepository};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id SERIAL PRIMARY KEY, \
     name TEXT NOT NULL, \
     description TEXT, \
     completed BOOLEAN NOT NULL DEFAULT FALSE, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

const TASK_COLUMNS: &str = "id, name, description, completed, created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i32,
    name: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            name: row.name,
            description: row.description,
            completed: row.completed,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> Vec<Task> {
    rows.into_iter().map(Task::from).collect()
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use todo_service::infrastructure::PostgresTaskRepository;
///
/// let pool = PgPool::connect("postgres://localhost/tasks_db").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
/// let stored = repository.create(candidate).await?;
/// ```
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
    logger: SharedLogger,
}

impl PostgresTaskRepository {
    /// Creates a repository that logs through `tracing`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_logger(pool, TracingLogger::shared("postgres_task_repository"))
    }

    /// Creates a repository with an injected logger.
    #[must_use]
    pub fn with_logger(pool: PgPool, logger: SharedLogger) -> Self {
        Self { pool, logger }
    }

    /// Creates the `tasks` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the statement fails.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        self.logger.debug("Ensuring tasks table exists");
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| log_failure(&self.logger, "creating schema", error))?;
        Ok(())
    }
}

impl std::fmt::Debug for PostgresTaskRepository {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PostgresTaskRepository")
            .field("pool", &self.pool)
            .field("logger", &"Arc<dyn OperationLogger>")
            .finish()
    }
}

fn log_failure(logger: &SharedLogger, action: &str, error: sqlx::Error) -> RepositoryError {
    logger.error(&format!("Error {action}: {error}"));
    RepositoryError::from(error)
}

impl TaskRepository for PostgresTaskRepository {
    fn get_all(&self, pagination: Pagination) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug("Getting all tasks from PostgreSQL");
            let rows: Vec<TaskRow> = sqlx::query_as(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id LIMIT $1 OFFSET $2"
            ))
            .bind(pagination.sql_limit())
            .bind(pagination.sql_offset())
            .fetch_all(&pool)
            .await
            .map_err(|error| log_failure(&logger, "getting all tasks", error))?;

            logger.info(&format!("Retrieved {} tasks from database", rows.len()));
            Ok(into_tasks(rows))
        }
        .boxed()
    }

    fn get_by_id(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Getting task by ID: {id} from PostgreSQL"));
            let row: Option<TaskRow> =
                sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                    .bind(id.value())
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| log_failure(&logger, "getting task by ID", error))?;

            match &row {
                Some(found) => logger.info(&format!("Task found: {}", found.name)),
                None => logger.warn(&format!("Task not found with ID: {id}")),
            }
            Ok(row.map(Task::from))
        }
        .boxed()
    }

    fn create(&self, task: Task) -> BoxFuture<'static, RepositoryResult<Task>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Creating task: {} in PostgreSQL", task.name));
            let row: TaskRow = sqlx::query_as(&format!(
                "INSERT INTO tasks (name, description, completed, created_at, updated_at) \
                 VALUES ($1, $2, $3, NOW(), NOW()) \
                 RETURNING {TASK_COLUMNS}"
            ))
            .bind(&task.name)
            .bind(task.description.as_deref())
            .bind(task.completed)
            .fetch_one(&pool)
            .await
            .map_err(|error| log_failure(&logger, "creating task", error))?;

            logger.info(&format!("Task created with ID: {}", row.id));
            Ok(Task::from(row))
        }
        .boxed()
    }

    fn update(&self, id: TaskId, task: Task) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Updating task with ID: {id} in PostgreSQL"));
            let row: Option<TaskRow> = sqlx::query_as(&format!(
                "UPDATE tasks SET name = $1, description = $2, completed = $3, updated_at = NOW() \
                 WHERE id = $4 \
                 RETURNING {TASK_COLUMNS}"
            ))
            .bind(&task.name)
            .bind(task.description.as_deref())
            .bind(task.completed)
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(|error| log_failure(&logger, "updating task", error))?;

            match &row {
                Some(updated) => logger.info(&format!("Task updated: {}", updated.name)),
                None => logger.warn(&format!("Task not found for update with ID: {id}")),
            }
            Ok(row.map(Task::from))
        }
        .boxed()
    }

    fn set_completed(
        &self,
        id: TaskId,
        completed: bool,
    ) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!(
                "Setting completed={completed} on task with ID: {id} in PostgreSQL"
            ));
            // SET expressions read the pre-update row, so the CASE sees the old flag.
            let row: Option<TaskRow> = sqlx::query_as(&format!(
                "UPDATE tasks SET completed = $1, \
                 updated_at = CASE WHEN completed = $1 THEN updated_at ELSE NOW() END \
                 WHERE id = $2 \
                 RETURNING {TASK_COLUMNS}"
            ))
            .bind(completed)
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(|error| log_failure(&logger, "setting completion", error))?;

            match &row {
                Some(_) => logger.info(&format!("Task {id} completed={completed}")),
                None => logger.warn(&format!("Task not found for completion with ID: {id}")),
            }
            Ok(row.map(Task::from))
        }
        .boxed()
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Deleting task with ID: {id} from PostgreSQL"));
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id.value())
                .execute(&pool)
                .await
                .map_err(|error| log_failure(&logger, "deleting task", error))?;

            let deleted = result.rows_affected() > 0;
            if deleted {
                logger.info(&format!("Task deleted with ID: {id}"));
            } else {
                logger.warn(&format!("Task not found for deletion with ID: {id}"));
            }
            Ok(deleted)
        }
        .boxed()
    }

    fn get_by_status(
        &self,
        completed: bool,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            logger.debug(&format!("Getting tasks with completed={completed} from PostgreSQL"));
            let rows: Vec<TaskRow> = sqlx::query_as(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE completed = $1 \
                 ORDER BY id LIMIT $2 OFFSET $3"
            ))
            .bind(completed)
            .bind(pagination.sql_limit())
            .bind(pagination.sql_offset())
            .fetch_all(&pool)
            .await
            .map_err(|error| log_failure(&logger, "getting tasks by status", error))?;

            logger.info(&format!(
                "Retrieved {} tasks with completed={completed} from database",
                rows.len()
            ));
            Ok(into_tasks(rows))
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let pool = self.pool.clone();
        let logger = Arc::clone(&self.logger);
        async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
                .fetch_one(&pool)
                .await
                .map_err(|error| log_failure(&logger, "counting tasks", error))?;

            #[allow(clippy::cast_sign_loss)]
            let count = count as u64;
            Ok(count)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
