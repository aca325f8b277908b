//! Infrastructure module for storage backends.
//!
//! This module contains the repository trait, its in-memory and
//! `PostgreSQL` implementations, the injected logging capability, and the
//! factory that picks a backend at startup.

pub mod factory;
pub mod in_memory;
pub mod logging;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryConfigBuilder, RepositoryFactory,
    StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use logging::{LogLevel, NoopLogger, OperationLogger, SharedLogger, TracingLogger};
pub use postgres::PostgresTaskRepository;
pub use repository::{
    DEFAULT_LIMIT, MAX_LIMIT, Pagination, RepositoryError, RepositoryResult, TaskRepository,
};
