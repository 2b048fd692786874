//! Typed catalog seed construction.
//!
//! Courses are seeded (and admin-edited) as an ordered three-level
//! hierarchy. Seeds are plain structs with required fields checked at
//! compile time; ordering is derived from seed position at insert time,
//! which guarantees the per-parent `order_index` uniqueness invariant
//! without the caller having to number anything.

/// Seed for a course and its full stage/video hierarchy.
#[derive(Clone, Debug)]
pub struct CourseSeed {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub duration_weeks: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub instructor: Option<String>,
    pub average_rating: f64,
    pub is_featured: bool,
    pub stages: Vec<StageSeed>,
}

/// Seed for a stage within a course.
#[derive(Clone, Debug)]
pub struct StageSeed {
    pub title: String,
    pub description: Option<String>,
    pub duration_hours: Option<i64>,
    pub videos: Vec<VideoSeed>,
}

/// Seed for a video within a stage.
#[derive(Clone, Debug)]
pub struct VideoSeed {
    pub title: String,
    /// External media identifier (e.g. a YouTube video ID).
    pub media_id: String,
    pub duration_minutes: Option<i64>,
    pub description: Option<String>,
}

impl CourseSeed {
    /// Validate seed invariants that the type system can't express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::Error::InvalidSeed("course title is empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(crate::Error::InvalidSeed(format!(
                "course '{}' has an empty category",
                self.title
            )));
        }
        for stage in &self.stages {
            if stage.title.trim().is_empty() {
                return Err(crate::Error::InvalidSeed(format!(
                    "course '{}' has a stage with an empty title",
                    self.title
                )));
            }
            for video in &stage.videos {
                if video.title.trim().is_empty() || video.media_id.trim().is_empty() {
                    return Err(crate::Error::InvalidSeed(format!(
                        "stage '{}' has a video missing title or media id",
                        stage.title
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of videos across all stages.
    pub fn video_count(&self) -> usize {
        self.stages.iter().map(|s| s.videos.len()).sum()
    }
}
