//! To-do task service.
//!
//! A small CRUD service for tasks backed by an in-memory store or
//! `PostgreSQL`, exposed over HTTP with axum.
//!
//! # Modules
//!
//! - [`domain`]: task entity and validation rules
//! - [`infrastructure`]: repositories, factory and logging
//! - [`service`]: task operations on top of a repository
//! - [`api`]: HTTP handlers, DTOs and error responses
//! - [`config`]: environment-driven settings

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;
