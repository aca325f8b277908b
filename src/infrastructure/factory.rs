//! Repository factory for startup backend selection.
//!
//! The store implementation is chosen once, from explicit configuration,
//! and handed to the service as `Arc<dyn TaskRepository>`.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`:
//!   used to compose the URL when `DATABASE_URL` is absent and `DB_HOST` is set
//!
//! # Example
//!
//! ```ignore
//! use todo_service::infrastructure::{RepositoryConfig, RepositoryFactory};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::logging::{SharedLogger, TracingLogger};
use super::{InMemoryTaskRepository, PostgresTaskRepository, TaskRepository};

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local map. Data is lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` table.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE` is invalid or no
    /// database URL can be determined for `postgres`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();

        let database_url = read("DATABASE_URL").or_else(|| {
            read("DB_HOST").map(|host| {
                compose_database_url(&DatabaseParts {
                    host,
                    port: read("DB_PORT").unwrap_or_else(|| "5432".to_string()),
                    user: read("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                    password: read("DB_PASSWORD"),
                    name: read("DB_NAME").unwrap_or_else(|| "tasks_db".to_string()),
                    sslmode: read("DB_SSLMODE").unwrap_or_else(|| "disable".to_string()),
                })
            })
        });

        let config = Self {
            storage_mode,
            database_url,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if `postgres` is
    /// selected without a URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

struct DatabaseParts {
    host: String,
    port: String,
    user: String,
    password: Option<String>,
    name: String,
    sslmode: String,
}

// User and password are percent-encoded; reserved characters would
// otherwise end the user-info section early.
fn compose_database_url(parts: &DatabaseParts) -> String {
    let user = urlencoding::encode(&parts.user);
    let credentials = match &parts.password {
        Some(password) => format!("{user}:{}", urlencoding::encode(password)),
        None => user.into_owned(),
    };
    format!(
        "postgres://{credentials}@{}:{}/{}?sslmode={}",
        parts.host, parts.port, parts.name, parts.sslmode
    )
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```
/// use todo_service::infrastructure::{RepositoryConfig, StorageMode};
///
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/tasks_db")
///     .build()
///     .unwrap();
/// assert_eq!(config.storage_mode, StorageMode::Postgres);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// No database URL for the Postgres backend.
    #[error("DATABASE_URL (or DB_HOST) environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Invalid validation policy value.
    #[error("Invalid validation policy: '{0}'. Expected 'lenient' or 'strict'")]
    InvalidValidationPolicy(String),

    /// Invalid server port.
    #[error("Invalid port: '{0}'")]
    InvalidPort(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Schema creation error.
    #[error("Schema initialization error: {0}")]
    SchemaInitialization(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Creates the configured task repository.
#[derive(Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
    logger: Option<SharedLogger>,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    /// Overrides the logger injected into the created repository.
    #[must_use]
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Creates the repository selected by the configuration.
    ///
    /// For `Postgres` this connects a pool and makes sure the `tasks`
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database cannot be reached or the
    /// schema cannot be created.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository>, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => {
                let logger = self.logger_for("in_memory_task_repository");
                Ok(Arc::new(InMemoryTaskRepository::with_logger(logger)))
            }
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                let logger = self.logger_for("postgres_task_repository");
                let repository = PostgresTaskRepository::with_logger(pool, logger);
                repository
                    .ensure_schema()
                    .await
                    .map_err(|error| FactoryError::SchemaInitialization(error.to_string()))?;
                Ok(Arc::new(repository))
            }
        }
    }

    fn logger_for(&self, component: &'static str) -> SharedLogger {
        self.logger
            .clone()
            .unwrap_or_else(|| TracingLogger::shared(component))
    }

    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

impl std::fmt::Debug for RepositoryFactory {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RepositoryFactory")
            .field("config", &self.config)
            .field("logger", &self.logger.as_ref().map(|_| "Arc<dyn OperationLogger>"))
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
