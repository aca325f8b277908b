//! Injected logging capability for stores.
//!
//! Stores never reach for a global logger object. They receive an
//! `Arc<dyn OperationLogger>` at construction and report every operation
//! through it. The production implementation forwards to `tracing`, so the
//! subscriber installed by the binary decides what is emitted.

use std::fmt;
use std::sync::Arc;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        formatter.write_str(label)
    }
}

/// Fire-and-forget sink for operation log lines.
///
/// Implementations must not fail and must not influence control flow.
pub trait OperationLogger: Send + Sync {
    /// Records a message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Shared handle to an [`OperationLogger`].
pub type SharedLogger = Arc<dyn OperationLogger>;

// =============================================================================
// Tracing Logger
// =============================================================================

/// Forwards log lines to `tracing`, tagged with a component name.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    /// Creates a logger that tags every line with `component`.
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Creates a shared logger for the given component.
    #[must_use]
    pub fn shared(component: &'static str) -> SharedLogger {
        Arc::new(Self::new(component))
    }

    /// Returns the component name.
    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }
}

impl OperationLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let component = self.component;
        match level {
            LogLevel::Debug => tracing::debug!(component, "{message}"),
            LogLevel::Info => tracing::info!(component, "{message}"),
            LogLevel::Warn => tracing::warn!(component, "{message}"),
            LogLevel::Error => tracing::error!(component, "{message}"),
        }
    }
}

// =============================================================================
// Noop Logger
// =============================================================================

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl NoopLogger {
    /// Creates a shared no-op logger.
    #[must_use]
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl OperationLogger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

// =============================================================================
// Tests
// =============================================================================
