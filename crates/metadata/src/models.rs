//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Users
// =============================================================================

/// User account record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id PHC-formatted password hash.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Catalog hierarchy: courses -> stages -> videos
// =============================================================================

/// Course record.
///
/// `enrolled_students` is a best-effort display counter, mutated only
/// inside the enrollment transaction and never decremented (unenroll is
/// not a supported operation).
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub difficulty: String,
    pub duration_weeks: Option<i64>,
    pub instructor: Option<String>,
    pub average_rating: f64,
    pub enrolled_students: i64,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Stage record. `order_index` is unique within a course; sequential
/// intent, not enforced contiguous.
#[derive(Debug, Clone, FromRow)]
pub struct StageRow {
    pub stage_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration_hours: Option<i64>,
    pub order_index: i64,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Video record. `order_index` is unique within a stage.
#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub video_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    /// External media identifier (e.g. a YouTube video ID).
    pub media_id: String,
    pub order_index: i64,
    pub duration_minutes: Option<i64>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Progress ledger: enrollments -> video progress
// =============================================================================

/// Enrollment record, unique per (user, course).
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentRow {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: OffsetDateTime,
    /// Derived percentage in [0, 100], recomputed on every progress event.
    pub completion_percentage: f64,
    pub last_accessed: OffsetDateTime,
}

/// Per-user per-video watch state, unique per (user, video).
///
/// `completed` is caller-trusted: it may be set even when the watch
/// counters are short of a full pass.
#[derive(Debug, Clone, FromRow)]
pub struct VideoProgressRow {
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub watched_seconds: i64,
    /// Reported watch position in [0, 100], clamped at the boundary.
    pub progress_percent: f64,
    pub completed: bool,
    pub last_watched: OffsetDateTime,
}
