//! Application configuration.
//!
//! Server settings and the repository configuration are read from the
//! environment once at startup.

use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::domain::ValidationPolicy;
use crate::infrastructure::{ConfigurationError, RepositoryConfig};

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the server binds to.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
    /// Validation rules applied to task input.
    pub validation_policy: ValidationPolicy,
    /// Storage backend selection.
    pub repository: RepositoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            validation_policy: ValidationPolicy::default(),
            repository: RepositoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `TASK_VALIDATION` and the repository settings
    /// from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if any value is present but invalid.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Empty values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match read("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigurationError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let validation_policy = match read("TASK_VALIDATION") {
            Some(value) => value
                .parse::<ValidationPolicy>()
                .map_err(ConfigurationError::InvalidValidationPolicy)?,
            None => ValidationPolicy::default(),
        };

        let repository = RepositoryConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            validation_policy,
            repository,
        })
    }

    /// Resolves the socket address to bind.
    ///
    /// Falls back to the default host when `host` is not an IP literal.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self.host.parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!(host = %self.host, "Invalid HOST, falling back to {DEFAULT_HOST}");
            IpAddr::from([0, 0, 0, 0])
        });
        SocketAddr::new(ip, self.port)
    }
}
