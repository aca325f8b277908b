//! Repository trait for the task store.
//!
//! Every method returns a boxed `'static` future so implementations can sit
//! behind `Arc<dyn TaskRepository>` and be chosen at startup by the
//! [`RepositoryFactory`](super::RepositoryFactory).

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Task, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// "Not found" is not an error at this layer: lookups return `Option` and
/// mutations report whether a row matched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A statement failed to execute.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The backing store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// No further task ids can be assigned.
    #[error("Task id space exhausted")]
    IdSpaceExhausted,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::ConnectionError(error.to_string()),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items returned by list queries.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page size accepted from clients.
pub const MAX_LIMIT: u32 = 100;

/// Limit/offset pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of items to return.
    pub limit: u32,
    /// Number of items to skip.
    pub offset: u64,
}

impl Pagination {
    /// Creates new pagination parameters.
    #[must_use]
    pub const fn new(limit: u32, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Creates pagination that fetches all records.
    ///
    /// ```
    /// use todo_service::infrastructure::Pagination;
    ///
    /// let everything = Pagination::all();
    /// assert_eq!(everything.offset, 0);
    /// assert_eq!(everything.limit, u32::MAX);
    /// ```
    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: u32::MAX,
            offset: 0,
        }
    }

    /// Builds pagination from optional client input.
    ///
    /// Missing values fall back to the defaults; the limit is clamped to
    /// `1..=MAX_LIMIT`.
    #[must_use]
    pub fn from_query(limit: Option<u32>, offset: Option<u64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// Applies the window to an ordered iterator.
    pub fn apply<I>(self, items: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
    {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take)
    }

    /// Limit as a SQL `BIGINT` parameter.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// Offset as a SQL `BIGINT` parameter, saturating at `i64::MAX`.
    #[must_use]
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Result type returned by repository futures.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Keyed storage of tasks.
///
/// The store trusts its caller: validation happens in the service layer.
pub trait TaskRepository: Send + Sync {
    /// Lists tasks ordered by id within the pagination window.
    fn get_all(&self, pagination: Pagination) -> BoxFuture<'static, RepositoryResult<Vec<Task>>>;

    /// Finds a task by its ID.
    ///
    /// Returns `Ok(None)` if no task has this id.
    fn get_by_id(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<Option<Task>>>;

    /// Persists a new task.
    ///
    /// The store assigns a fresh id and the timestamps; whatever id the
    /// candidate carries is ignored.
    fn create(&self, task: Task) -> BoxFuture<'static, RepositoryResult<Task>>;

    /// Replaces name, description and completion flag of an existing task.
    ///
    /// Returns `Ok(None)` if the id does not exist. The id and creation
    /// timestamp are preserved.
    fn update(&self, id: TaskId, task: Task) -> BoxFuture<'static, RepositoryResult<Option<Task>>>;

    /// Sets the completion flag of an existing task in one step.
    ///
    /// Other fields are left as stored. `updated_at` only moves when the
    /// flag actually changes. Returns `Ok(None)` if the id does not exist.
    fn set_completed(
        &self,
        id: TaskId,
        completed: bool,
    ) -> BoxFuture<'static, RepositoryResult<Option<Task>>>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: TaskId) -> BoxFuture<'static, RepositoryResult<bool>>;

    /// Lists tasks with the given completion flag, ordered by id.
    fn get_by_status(
        &self,
        completed: bool,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>>;

    /// Counts all tasks.
    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>>;
}

// =============================================================================
// Tests
// =============================================================================
