//! Core domain types and shared logic for the Lectern course platform.
//!
//! This crate defines the canonical data model used across all other crates:
//! - User identifiers and caller identity
//! - Completion-percentage arithmetic and input clamping
//! - Typed catalog seed construction
//! - Configuration types

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod progress;

pub use catalog::{CourseSeed, StageSeed, VideoSeed};
pub use error::{Error, Result};
pub use identity::{Identity, UserId};
pub use progress::{clamp_percent, clamp_watched_seconds, completion_percentage};

/// Maximum completion percentage.
pub const MAX_PERCENT: f64 = 100.0;
