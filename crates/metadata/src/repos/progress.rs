//! Watch-progress repository and the course progress aggregator.

use crate::error::MetadataResult;
use crate::models::VideoProgressRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Outcome of a progress event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Course the video belongs to.
    pub course_id: Uuid,
    /// Recomputed course percentage, or `None` when the user has no
    /// enrollment record for the course (progress never implicitly
    /// enrolls).
    pub completion_percentage: Option<f64>,
}

/// Repository for per-video watch progress and the derived course
/// percentage.
#[async_trait]
pub trait ProgressRepo: Send + Sync {
    /// Record a progress event for a (user, video) pair.
    ///
    /// Runs as a single transaction: resolves the video through an active
    /// stage/course chain (`NotFound` otherwise), clamps the reported
    /// values (seconds to >= 0, percent into [0, 100]), upserts the
    /// `video_progress` row with `last_watched = now`, and recomputes the
    /// course percentage into the user's enrollment record when one
    /// exists. Any failure rolls the whole step back.
    ///
    /// `completed` is caller-trusted and stored as reported.
    async fn record_video_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        watched_seconds: i64,
        progress_percent: f64,
        completed: bool,
        now: OffsetDateTime,
    ) -> MetadataResult<ProgressUpdate>;

    /// Recompute a user's completion percentage for a course from the
    /// current `video_progress` rows.
    ///
    /// Idempotent; a course with zero active videos recomputes to 0.
    /// Returns the percentage written, or `None` when the user is not
    /// enrolled (no-op).
    async fn recompute_course_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<f64>>;

    /// Get the progress row for a (user, video) pair.
    async fn get_video_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
    ) -> MetadataResult<Option<VideoProgressRow>>;

    /// Get all of a user's progress rows for videos of one course
    /// (read-path annotation).
    async fn list_progress_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> MetadataResult<Vec<VideoProgressRow>>;
}
