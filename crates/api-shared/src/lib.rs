//! # API Shared
//!
//! Shared utilities and definitions for Masthead APIs.
//!
//! Contains:
//! - Request/response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Startup configuration resolved from the environment
//!
//! Used by `api-rest`, the CLI and the `masthead-run` binary.

pub mod config;
pub mod dto;
pub mod health;

pub use health::HealthService;
pub use dto::*;
