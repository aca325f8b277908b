//! Service module.
//!
//! The task service is the only place domain rules are enforced before a
//! store mutation.

pub mod task_service;

pub use task_service::{ServiceError, ServiceResult, TaskService};
