//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{CatalogRepo, EnrollmentRepo, ProgressRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore:
    UserRepo + CatalogRepo + EnrollmentRepo + ProgressRepo + Send + Sync
{
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store and run migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection
            // also serializes every progress transaction at the database,
            // matching the single-writer-per-aggregate model.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique-constraint failure to `AlreadyExists`, everything else to
/// `Database`.
fn map_unique(e: sqlx::Error, what: impl Into<String>) -> MetadataError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            MetadataError::AlreadyExists(what.into())
        }
        _ => MetadataError::Database(e),
    }
}

/// Map a unique-constraint failure to `Constraint` (ordering collisions
/// within a parent), everything else to `Database`.
fn map_constraint(e: sqlx::Error, what: impl Into<String>) -> MetadataError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            MetadataError::Constraint(what.into())
        }
        _ => MetadataError::Database(e),
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use crate::repos::ProgressUpdate;
    use lectern_core::progress::{clamp_percent, clamp_watched_seconds, completion_percentage};
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO users (
                    user_id, username, email, password_hash,
                    first_name, last_name, is_admin, is_active, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.is_admin)
            .bind(user.is_active)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique(
                    e,
                    format!(
                        "user with username '{}' or email '{}' already exists",
                        user.username, user.email
                    ),
                )
            })?;
            Ok(())
        }

        async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_users(&self) -> MetadataResult<Vec<UserRow>> {
            let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY username")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn update_user(&self, user: &UserRow) -> MetadataResult<()> {
            let result = sqlx::query(
                r#"
                UPDATE users
                SET first_name = ?, last_name = ?, is_admin = ?, is_active = ?
                WHERE user_id = ?
                "#,
            )
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.is_admin)
            .bind(user.is_active)
            .bind(user.user_id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "user_id {} not found",
                    user.user_id
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CatalogRepo for SqliteStore {
        async fn create_course(&self, course: &CourseRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO courses (
                    course_id, title, description, thumbnail_url, category,
                    difficulty, duration_weeks, instructor, average_rating,
                    enrolled_students, is_featured, is_active, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(course.course_id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.thumbnail_url)
            .bind(&course.category)
            .bind(&course.difficulty)
            .bind(course.duration_weeks)
            .bind(&course.instructor)
            .bind(course.average_rating)
            .bind(course.enrolled_students)
            .bind(course.is_featured)
            .bind(course.is_active)
            .bind(course.created_at)
            .bind(course.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, format!("course_id {} already exists", course.course_id)))?;
            Ok(())
        }

        async fn create_stage(&self, stage: &StageRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO stages (
                    stage_id, course_id, title, description, duration_hours,
                    order_index, is_active, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(stage.stage_id)
            .bind(stage.course_id)
            .bind(&stage.title)
            .bind(&stage.description)
            .bind(stage.duration_hours)
            .bind(stage.order_index)
            .bind(stage.is_active)
            .bind(stage.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint(
                    e,
                    format!(
                        "order_index {} already taken in course {}",
                        stage.order_index, stage.course_id
                    ),
                )
            })?;
            Ok(())
        }

        async fn create_video(&self, video: &VideoRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO videos (
                    video_id, stage_id, title, media_id, order_index,
                    duration_minutes, description, is_active, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(video.video_id)
            .bind(video.stage_id)
            .bind(&video.title)
            .bind(&video.media_id)
            .bind(video.order_index)
            .bind(video.duration_minutes)
            .bind(&video.description)
            .bind(video.is_active)
            .bind(video.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint(
                    e,
                    format!(
                        "order_index {} already taken in stage {}",
                        video.order_index, video.stage_id
                    ),
                )
            })?;
            Ok(())
        }

        async fn get_course(&self, course_id: Uuid) -> MetadataResult<Option<CourseRow>> {
            let row = sqlx::query_as::<_, CourseRow>("SELECT * FROM courses WHERE course_id = ?")
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_active_courses(&self) -> MetadataResult<Vec<CourseRow>> {
            let rows = sqlx::query_as::<_, CourseRow>(
                "SELECT * FROM courses WHERE is_active = 1 ORDER BY title",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_all_courses(&self) -> MetadataResult<Vec<CourseRow>> {
            let rows = sqlx::query_as::<_, CourseRow>("SELECT * FROM courses ORDER BY title")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn list_active_stages(&self, course_id: Uuid) -> MetadataResult<Vec<StageRow>> {
            let rows = sqlx::query_as::<_, StageRow>(
                "SELECT * FROM stages WHERE course_id = ? AND is_active = 1 ORDER BY order_index",
            )
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_active_videos(&self, stage_id: Uuid) -> MetadataResult<Vec<VideoRow>> {
            let rows = sqlx::query_as::<_, VideoRow>(
                "SELECT * FROM videos WHERE stage_id = ? AND is_active = 1 ORDER BY order_index",
            )
            .bind(stage_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_categories(&self) -> MetadataResult<Vec<String>> {
            let rows: Vec<String> = sqlx::query_scalar(
                "SELECT DISTINCT category FROM courses WHERE is_active = 1 ORDER BY category",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn count_courses(&self) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }

        async fn set_course_active(
            &self,
            course_id: Uuid,
            is_active: bool,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result =
                sqlx::query("UPDATE courses SET is_active = ?, updated_at = ? WHERE course_id = ?")
                    .bind(is_active)
                    .bind(updated_at)
                    .bind(course_id)
                    .execute(&self.pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "course_id {course_id} not found"
                )));
            }
            Ok(())
        }

        async fn set_course_featured(
            &self,
            course_id: Uuid,
            is_featured: bool,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result = sqlx::query(
                "UPDATE courses SET is_featured = ?, updated_at = ? WHERE course_id = ?",
            )
            .bind(is_featured)
            .bind(updated_at)
            .bind(course_id)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "course_id {course_id} not found"
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EnrollmentRepo for SqliteStore {
        async fn enroll(
            &self,
            user_id: Uuid,
            course_id: Uuid,
            now: OffsetDateTime,
        ) -> MetadataResult<EnrollmentRow> {
            let mut tx = self.pool.begin().await?;

            let active: Option<bool> =
                sqlx::query_scalar("SELECT is_active FROM courses WHERE course_id = ?")
                    .bind(course_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            match active {
                Some(true) => {}
                _ => {
                    return Err(MetadataError::NotFound(format!(
                        "course {course_id} not found or inactive"
                    )));
                }
            }

            let existing: Option<i64> = sqlx::query_scalar(
                "SELECT 1 FROM enrollments WHERE user_id = ? AND course_id = ?",
            )
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
            if existing.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "user {user_id} is already enrolled in course {course_id}"
                )));
            }

            let enrollment = EnrollmentRow {
                user_id,
                course_id,
                enrolled_at: now,
                completion_percentage: 0.0,
                last_accessed: now,
            };

            sqlx::query(
                r#"
                INSERT INTO enrollments (
                    user_id, course_id, enrolled_at, completion_percentage, last_accessed
                ) VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(enrollment.user_id)
            .bind(enrollment.course_id)
            .bind(enrollment.enrolled_at)
            .bind(enrollment.completion_percentage)
            .bind(enrollment.last_accessed)
            .execute(&mut *tx)
            .await?;

            // Display counter; incremented only here, never decremented.
            sqlx::query(
                "UPDATE courses SET enrolled_students = enrolled_students + 1, updated_at = ? \
                 WHERE course_id = ?",
            )
            .bind(now)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(enrollment)
        }

        async fn get_enrollment(
            &self,
            user_id: Uuid,
            course_id: Uuid,
        ) -> MetadataResult<Option<EnrollmentRow>> {
            let row = sqlx::query_as::<_, EnrollmentRow>(
                "SELECT * FROM enrollments WHERE user_id = ? AND course_id = ?",
            )
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_enrollments_for_user(
            &self,
            user_id: Uuid,
        ) -> MetadataResult<Vec<EnrollmentRow>> {
            let rows = sqlx::query_as::<_, EnrollmentRow>(
                "SELECT * FROM enrollments WHERE user_id = ? ORDER BY last_accessed DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }

    /// Recompute the course percentage for a user inside an open
    /// transaction. Returns the percentage written, or `None` when the
    /// user has no enrollment row (progress never implicitly enrolls).
    async fn recompute_in_tx(
        tx: &mut sqlx::SqliteConnection,
        user_id: Uuid,
        course_id: Uuid,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<f64>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM videos v
            JOIN stages s ON s.stage_id = v.stage_id
            WHERE s.course_id = ? AND v.is_active = 1 AND s.is_active = 1
            "#,
        )
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;

        let completed: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM video_progress p
            JOIN videos v ON v.video_id = p.video_id
            JOIN stages s ON s.stage_id = v.stage_id
            WHERE s.course_id = ? AND p.user_id = ? AND p.completed = 1
              AND v.is_active = 1 AND s.is_active = 1
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let percentage = completion_percentage(completed as u64, total as u64);

        let result = sqlx::query(
            "UPDATE enrollments SET completion_percentage = ?, last_accessed = ? \
             WHERE user_id = ? AND course_id = ?",
        )
        .bind(percentage)
        .bind(now)
        .bind(user_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(percentage))
        }
    }

    #[async_trait]
    impl ProgressRepo for SqliteStore {
        async fn record_video_progress(
            &self,
            user_id: Uuid,
            video_id: Uuid,
            watched_seconds: i64,
            progress_percent: f64,
            completed: bool,
            now: OffsetDateTime,
        ) -> MetadataResult<ProgressUpdate> {
            let mut tx = self.pool.begin().await?;

            // The video must resolve through an active stage/course chain.
            let course_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                SELECT s.course_id
                FROM videos v
                JOIN stages s ON s.stage_id = v.stage_id
                JOIN courses c ON c.course_id = s.course_id
                WHERE v.video_id = ? AND v.is_active = 1
                  AND s.is_active = 1 AND c.is_active = 1
                "#,
            )
            .bind(video_id)
            .fetch_optional(&mut *tx)
            .await?;

            let course_id = course_id.ok_or_else(|| {
                MetadataError::NotFound(format!("video {video_id} not found or inactive"))
            })?;

            let watched_seconds = clamp_watched_seconds(watched_seconds);
            let progress_percent = clamp_percent(progress_percent);

            sqlx::query(
                r#"
                INSERT INTO video_progress (
                    user_id, video_id, watched_seconds, progress_percent,
                    completed, last_watched
                ) VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(user_id, video_id) DO UPDATE SET
                    watched_seconds = excluded.watched_seconds,
                    progress_percent = excluded.progress_percent,
                    completed = excluded.completed,
                    last_watched = excluded.last_watched
                "#,
            )
            .bind(user_id)
            .bind(video_id)
            .bind(watched_seconds)
            .bind(progress_percent)
            .bind(completed)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let completion_percentage = recompute_in_tx(&mut tx, user_id, course_id, now).await?;
            tx.commit().await?;

            Ok(ProgressUpdate {
                course_id,
                completion_percentage,
            })
        }

        async fn recompute_course_progress(
            &self,
            user_id: Uuid,
            course_id: Uuid,
            now: OffsetDateTime,
        ) -> MetadataResult<Option<f64>> {
            let mut tx = self.pool.begin().await?;
            let percentage = recompute_in_tx(&mut tx, user_id, course_id, now).await?;
            tx.commit().await?;
            Ok(percentage)
        }

        async fn get_video_progress(
            &self,
            user_id: Uuid,
            video_id: Uuid,
        ) -> MetadataResult<Option<VideoProgressRow>> {
            let row = sqlx::query_as::<_, VideoProgressRow>(
                "SELECT * FROM video_progress WHERE user_id = ? AND video_id = ?",
            )
            .bind(user_id)
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_progress_for_course(
            &self,
            user_id: Uuid,
            course_id: Uuid,
        ) -> MetadataResult<Vec<VideoProgressRow>> {
            let rows = sqlx::query_as::<_, VideoProgressRow>(
                r#"
                SELECT p.*
                FROM video_progress p
                JOIN videos v ON v.video_id = p.video_id
                JOIN stages s ON s.stage_id = v.stage_id
                WHERE p.user_id = ? AND s.course_id = ?
                "#,
            )
            .bind(user_id)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- Users
CREATE TABLE IF NOT EXISTS users (
    user_id BLOB PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    is_admin INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);

-- Catalog: courses -> stages -> videos
CREATE TABLE IF NOT EXISTS courses (
    course_id BLOB PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    thumbnail_url TEXT,
    category TEXT NOT NULL,
    difficulty TEXT NOT NULL DEFAULT 'Beginner',
    duration_weeks INTEGER,
    instructor TEXT,
    average_rating REAL NOT NULL DEFAULT 0,
    enrolled_students INTEGER NOT NULL DEFAULT 0,
    is_featured INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_courses_active ON courses(is_active, category);

CREATE TABLE IF NOT EXISTS stages (
    stage_id BLOB PRIMARY KEY,
    course_id BLOB NOT NULL REFERENCES courses(course_id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    duration_hours INTEGER,
    order_index INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    UNIQUE (course_id, order_index)
);
CREATE INDEX IF NOT EXISTS idx_stages_course ON stages(course_id, order_index);

CREATE TABLE IF NOT EXISTS videos (
    video_id BLOB PRIMARY KEY,
    stage_id BLOB NOT NULL REFERENCES stages(stage_id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    media_id TEXT NOT NULL,
    order_index INTEGER NOT NULL,
    duration_minutes INTEGER,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    UNIQUE (stage_id, order_index)
);
CREATE INDEX IF NOT EXISTS idx_videos_stage ON videos(stage_id, order_index);

-- Progress ledger: enrollments -> video progress
CREATE TABLE IF NOT EXISTS enrollments (
    user_id BLOB NOT NULL REFERENCES users(user_id),
    course_id BLOB NOT NULL REFERENCES courses(course_id),
    enrolled_at TEXT NOT NULL,
    completion_percentage REAL NOT NULL DEFAULT 0,
    last_accessed TEXT NOT NULL,
    PRIMARY KEY (user_id, course_id)
);
CREATE INDEX IF NOT EXISTS idx_enrollments_user ON enrollments(user_id, last_accessed);

-- Deleting a video hard-deletes its progress rows; enrollments survive.
CREATE TABLE IF NOT EXISTS video_progress (
    user_id BLOB NOT NULL REFERENCES users(user_id),
    video_id BLOB NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    watched_seconds INTEGER NOT NULL DEFAULT 0,
    progress_percent REAL NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    last_watched TEXT NOT NULL,
    PRIMARY KEY (user_id, video_id)
);
CREATE INDEX IF NOT EXISTS idx_video_progress_user ON video_progress(user_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::repos::{CatalogRepo, EnrollmentRepo, ProgressRepo, UserRepo};
    use time::OffsetDateTime;
    use uuid::Uuid;

    async fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (temp_dir, store)
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn user_row(username: &str) -> UserRow {
        UserRow {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$fake".to_string(),
            first_name: None,
            last_name: None,
            is_admin: false,
            is_active: true,
            created_at: now(),
        }
    }

    fn course_row(title: &str, category: &str) -> CourseRow {
        CourseRow {
            course_id: Uuid::new_v4(),
            title: title.to_string(),
            description: "test course".to_string(),
            thumbnail_url: None,
            category: category.to_string(),
            difficulty: "Beginner".to_string(),
            duration_weeks: Some(4),
            instructor: None,
            average_rating: 0.0,
            enrolled_students: 0,
            is_featured: false,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn stage_row(course_id: Uuid, order_index: i64) -> StageRow {
        StageRow {
            stage_id: Uuid::new_v4(),
            course_id,
            title: format!("Stage {order_index}"),
            description: None,
            duration_hours: None,
            order_index,
            is_active: true,
            created_at: now(),
        }
    }

    fn video_row(stage_id: Uuid, order_index: i64) -> VideoRow {
        VideoRow {
            video_id: Uuid::new_v4(),
            stage_id,
            title: format!("Video {order_index}"),
            media_id: format!("media-{order_index}"),
            order_index,
            duration_minutes: Some(10),
            description: None,
            is_active: true,
            created_at: now(),
        }
    }

    /// Seed one active course with a single stage holding `video_count`
    /// videos.
    async fn seed_course(store: &SqliteStore, video_count: i64) -> (CourseRow, Vec<VideoRow>) {
        let course = course_row("Test Course", "Testing");
        store.create_course(&course).await.unwrap();
        let stage = stage_row(course.course_id, 1);
        store.create_stage(&stage).await.unwrap();
        let mut videos = Vec::new();
        for i in 1..=video_count {
            let video = video_row(stage.stage_id, i);
            store.create_video(&video).await.unwrap();
            videos.push(video);
        }
        (course, videos)
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();

        let fetched = store.get_user(user.user_id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.email, "alice@example.com");
        assert!(!fetched.is_admin);

        let by_name = store.get_user_by_username("alice").await.unwrap();
        assert!(by_name.is_some());
        let by_email = store.get_user_by_email("alice@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert!(store.get_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (_dir, store) = test_store().await;
        store.create_user(&user_row("alice")).await.unwrap();

        let mut dup = user_row("alice");
        dup.email = "other@example.com".to_string();
        let err = store.create_user(&dup).await.unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_not_found() {
        let (_dir, store) = test_store().await;
        let err = store.update_user(&user_row("ghost")).await.unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_catalog_listing_filters_inactive() {
        let (_dir, store) = test_store().await;
        let active = course_row("Active", "Rust");
        let mut inactive = course_row("Hidden", "Go");
        inactive.is_active = false;
        store.create_course(&active).await.unwrap();
        store.create_course(&inactive).await.unwrap();

        let listed = store.list_active_courses().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Active");

        let all = store.list_all_courses().await.unwrap();
        assert_eq!(all.len(), 2);

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn test_stage_and_video_ordering() {
        let (_dir, store) = test_store().await;
        let course = course_row("Ordered", "Rust");
        store.create_course(&course).await.unwrap();

        // Insert out of order; listing must come back ordered.
        let s2 = stage_row(course.course_id, 2);
        let s1 = stage_row(course.course_id, 1);
        store.create_stage(&s2).await.unwrap();
        store.create_stage(&s1).await.unwrap();

        let stages = store.list_active_stages(course.course_id).await.unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].order_index, 1);
        assert_eq!(stages[1].order_index, 2);

        store.create_video(&video_row(s1.stage_id, 2)).await.unwrap();
        store.create_video(&video_row(s1.stage_id, 1)).await.unwrap();
        let videos = store.list_active_videos(s1.stage_id).await.unwrap();
        assert_eq!(videos[0].order_index, 1);
        assert_eq!(videos[1].order_index, 2);
    }

    #[tokio::test]
    async fn test_duplicate_order_index_is_constraint() {
        let (_dir, store) = test_store().await;
        let course = course_row("Clash", "Rust");
        store.create_course(&course).await.unwrap();
        store
            .create_stage(&stage_row(course.course_id, 1))
            .await
            .unwrap();

        let err = store
            .create_stage(&stage_row(course.course_id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_enroll_starts_at_zero_and_bumps_counter() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, _videos) = seed_course(&store, 2).await;

        let enrollment = store.enroll(user.user_id, course.course_id, now()).await.unwrap();
        assert_eq!(enrollment.completion_percentage, 0.0);

        let refreshed = store.get_course(course.course_id).await.unwrap().unwrap();
        assert_eq!(refreshed.enrolled_students, 1);

        let listed = store.list_enrollments_for_user(user.user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].course_id, course.course_id);
    }

    #[tokio::test]
    async fn test_enroll_duplicate_rejected() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, _videos) = seed_course(&store, 1).await;

        store.enroll(user.user_id, course.course_id, now()).await.unwrap();
        let err = store
            .enroll(user.user_id, course.course_id, now())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(_)));

        // Counter unchanged by the failed attempt.
        let refreshed = store.get_course(course.course_id).await.unwrap().unwrap();
        assert_eq!(refreshed.enrolled_students, 1);
    }

    #[tokio::test]
    async fn test_enroll_inactive_course_not_found() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let mut course = course_row("Hidden", "Rust");
        course.is_active = false;
        store.create_course(&course).await.unwrap();

        let err = store
            .enroll(user.user_id, course.course_id, now())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_progress_completion_walkthrough() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, videos) = seed_course(&store, 2).await;
        store.enroll(user.user_id, course.course_id, now()).await.unwrap();

        // Complete the first of two videos: 50%.
        let update = store
            .record_video_progress(user.user_id, videos[0].video_id, 600, 100.0, true, now())
            .await
            .unwrap();
        assert_eq!(update.course_id, course.course_id);
        assert_eq!(update.completion_percentage, Some(50.0));

        // Partial progress on the second does not move the aggregate.
        let update = store
            .record_video_progress(user.user_id, videos[1].video_id, 120, 40.0, false, now())
            .await
            .unwrap();
        assert_eq!(update.completion_percentage, Some(50.0));

        // Completing the second reaches exactly 100.
        let update = store
            .record_video_progress(user.user_id, videos[1].video_id, 600, 100.0, true, now())
            .await
            .unwrap();
        assert_eq!(update.completion_percentage, Some(100.0));

        // Resubmitting a completed video is idempotent.
        let update = store
            .record_video_progress(user.user_id, videos[1].video_id, 600, 100.0, true, now())
            .await
            .unwrap();
        assert_eq!(update.completion_percentage, Some(100.0));

        let enrollment = store
            .get_enrollment(user.user_id, course.course_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(enrollment.completion_percentage, 100.0);
    }

    #[tokio::test]
    async fn test_progress_values_are_clamped() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, videos) = seed_course(&store, 1).await;
        store.enroll(user.user_id, course.course_id, now()).await.unwrap();

        store
            .record_video_progress(user.user_id, videos[0].video_id, -30, 150.0, false, now())
            .await
            .unwrap();

        let row = store
            .get_video_progress(user.user_id, videos[0].video_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.watched_seconds, 0);
        assert_eq!(row.progress_percent, 100.0);
        assert!(!row.completed);
    }

    #[tokio::test]
    async fn test_progress_without_enrollment_stores_row_only() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, videos) = seed_course(&store, 1).await;

        let update = store
            .record_video_progress(user.user_id, videos[0].video_id, 60, 100.0, true, now())
            .await
            .unwrap();
        assert_eq!(update.completion_percentage, None);

        // No enrollment was created implicitly.
        let enrollment = store
            .get_enrollment(user.user_id, course.course_id)
            .await
            .unwrap();
        assert!(enrollment.is_none());

        // But the per-video row was recorded.
        let row = store
            .get_video_progress(user.user_id, videos[0].video_id)
            .await
            .unwrap();
        assert!(row.is_some());
    }

    #[tokio::test]
    async fn test_progress_unknown_or_inactive_video_not_found() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (_course, videos) = seed_course(&store, 1).await;

        let err = store
            .record_video_progress(user.user_id, Uuid::new_v4(), 60, 50.0, false, now())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));

        sqlx::query("UPDATE videos SET is_active = 0 WHERE video_id = ?")
            .bind(videos[0].video_id)
            .execute(store.pool())
            .await
            .unwrap();
        let err = store
            .record_video_progress(user.user_id, videos[0].video_id, 60, 50.0, false, now())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recompute_zero_video_course_is_zero() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let course = course_row("Empty", "Rust");
        store.create_course(&course).await.unwrap();
        store.enroll(user.user_id, course.course_id, now()).await.unwrap();

        let pct = store
            .recompute_course_progress(user.user_id, course.course_id, now())
            .await
            .unwrap();
        assert_eq!(pct, Some(0.0));
    }

    #[tokio::test]
    async fn test_recompute_excludes_deactivated_videos() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, videos) = seed_course(&store, 2).await;
        store.enroll(user.user_id, course.course_id, now()).await.unwrap();

        store
            .record_video_progress(user.user_id, videos[0].video_id, 600, 100.0, true, now())
            .await
            .unwrap();

        // Deactivating the unwatched video shrinks the denominator.
        sqlx::query("UPDATE videos SET is_active = 0 WHERE video_id = ?")
            .bind(videos[1].video_id)
            .execute(store.pool())
            .await
            .unwrap();

        let pct = store
            .recompute_course_progress(user.user_id, course.course_id, now())
            .await
            .unwrap();
        assert_eq!(pct, Some(100.0));
    }

    #[tokio::test]
    async fn test_toggle_course_flags() {
        let (_dir, store) = test_store().await;
        let (course, _videos) = seed_course(&store, 1).await;

        store
            .set_course_active(course.course_id, false, now())
            .await
            .unwrap();
        store
            .set_course_featured(course.course_id, true, now())
            .await
            .unwrap();

        let refreshed = store.get_course(course.course_id).await.unwrap().unwrap();
        assert!(!refreshed.is_active);
        assert!(refreshed.is_featured);

        let err = store
            .set_course_active(Uuid::new_v4(), true, now())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_progress_for_course() {
        let (_dir, store) = test_store().await;
        let user = user_row("alice");
        store.create_user(&user).await.unwrap();
        let (course, videos) = seed_course(&store, 3).await;
        store.enroll(user.user_id, course.course_id, now()).await.unwrap();

        store
            .record_video_progress(user.user_id, videos[0].video_id, 60, 30.0, false, now())
            .await
            .unwrap();
        store
            .record_video_progress(user.user_id, videos[2].video_id, 600, 100.0, true, now())
            .await
            .unwrap();

        let rows = store
            .list_progress_for_course(user.user_id, course.course_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
