//! HTTP API server for the Lectern course platform.
//!
//! This crate provides the HTTP control plane:
//! - Account registration and token-based sessions
//! - Catalog browsing (courses, stages, videos, categories)
//! - Enrollment and per-video watch progress
//! - Learner dashboard
//! - Admin endpoints (user and course management)

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::TraceId;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
