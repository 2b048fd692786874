//! HTTP request handlers.

pub mod admin;
pub mod auth;
pub mod common;
pub mod courses;
pub mod dashboard;
pub mod progress;

pub use admin::*;
pub use auth::*;
pub use common::*;
pub use courses::*;
pub use dashboard::*;
pub use progress::*;
