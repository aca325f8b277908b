//! Validation rules for tasks.
//!
//! Validation runs in the service layer before any store mutation. Two rule
//! sets exist: the default lenient set treats the description as optional,
//! while the strict set also requires a non-empty description.

use std::str::FromStr;

use thiserror::Error;

use super::task::Task;

/// Maximum task name length, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

// =============================================================================
// Validation Error
// =============================================================================

/// A rule violated by a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The name is empty or whitespace-only.
    #[error("task name cannot be empty")]
    EmptyName,

    /// The name is longer than [`MAX_NAME_LENGTH`] characters.
    #[error("task name must not exceed {max} characters (got {length})")]
    NameTooLong { length: usize, max: usize },

    /// The description is missing or whitespace-only under
    /// [`ValidationPolicy::Strict`].
    #[error("task description cannot be empty")]
    EmptyDescription,

    /// The identifier is negative.
    #[error("task ID must not be negative: {0}")]
    InvalidId(i32),
}

impl ValidationError {
    /// Returns the name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyDescription => "description",
            Self::InvalidId(_) => "id",
        }
    }
}

// =============================================================================
// Validation Policy
// =============================================================================

/// Which rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Name required and bounded; description optional.
    #[default]
    Lenient,
    /// Additionally requires a non-empty description.
    Strict,
}

impl ValidationPolicy {
    const fn requires_description(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "lenient" | "default" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(value.to_string()),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Checks a task against the given policy.
///
/// Rules are checked in order: name, description, identifier. The first
/// violation is returned.
///
/// # Errors
///
/// Returns the first [`ValidationError`] the task violates.
pub fn validate(task: &Task, policy: ValidationPolicy) -> Result<(), ValidationError> {
    validate_name(&task.name)?;

    if policy.requires_description()
        && task
            .description
            .as_deref()
            .is_none_or(|description| description.trim().is_empty())
    {
        return Err(ValidationError::EmptyDescription);
    }

    if task.id.is_negative() {
        return Err(ValidationError::InvalidId(task.id.value()));
    }

    Ok(())
}

/// Validates a task name on its own.
///
/// # Errors
///
/// Returns `EmptyName` or `NameTooLong`.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            length,
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
