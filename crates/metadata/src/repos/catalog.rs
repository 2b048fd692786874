//! Catalog repository: the course -> stage -> video hierarchy.

use crate::error::MetadataResult;
use crate::models::{CourseRow, StageRow, VideoRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for catalog operations.
///
/// The catalog owns its hierarchy top-down: stages belong to exactly one
/// course and videos to exactly one stage, ordered by `order_index` within
/// their parent. Rows are soft-deleted via the active flag; hard deletes
/// happen only through foreign-key cascades.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// Create a course.
    async fn create_course(&self, course: &CourseRow) -> MetadataResult<()>;

    /// Create a stage. Fails with `Constraint` if the (course, order_index)
    /// pair is already taken.
    async fn create_stage(&self, stage: &StageRow) -> MetadataResult<()>;

    /// Create a video. Fails with `Constraint` if the (stage, order_index)
    /// pair is already taken.
    async fn create_video(&self, video: &VideoRow) -> MetadataResult<()>;

    /// Get a course by ID, active or not.
    async fn get_course(&self, course_id: Uuid) -> MetadataResult<Option<CourseRow>>;

    /// List active courses, ordered by title.
    async fn list_active_courses(&self) -> MetadataResult<Vec<CourseRow>>;

    /// List all courses including inactive ones (admin surface).
    async fn list_all_courses(&self) -> MetadataResult<Vec<CourseRow>>;

    /// List the active stages of a course in ascending order_index order.
    async fn list_active_stages(&self, course_id: Uuid) -> MetadataResult<Vec<StageRow>>;

    /// List the active videos of a stage in ascending order_index order.
    async fn list_active_videos(&self, stage_id: Uuid) -> MetadataResult<Vec<VideoRow>>;

    /// Sorted distinct categories of active courses.
    async fn list_categories(&self) -> MetadataResult<Vec<String>>;

    /// Count all courses (used by catalog seeding).
    async fn count_courses(&self) -> MetadataResult<u64>;

    /// Set a course's active flag. Fails with `NotFound` if absent.
    async fn set_course_active(
        &self,
        course_id: Uuid,
        is_active: bool,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Set a course's featured flag. Fails with `NotFound` if absent.
    async fn set_course_featured(
        &self,
        course_id: Uuid,
        is_featured: bool,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<()>;
}
