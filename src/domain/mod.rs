//! Domain module for task tracking.
//!
//! This module contains the task entity, its identifier and timestamp
//! value objects, and the validation rules applied before persistence.

pub mod task;
pub mod validation;

pub use task::{Task, TaskId, Timestamp};
pub use validation::{MAX_NAME_LENGTH, ValidationError, ValidationPolicy};
