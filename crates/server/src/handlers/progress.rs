//! Watch-progress endpoints.

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::handlers::common::parse_json_body;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// Percentage of the video watched. Clamped into [0, 100].
    #[serde(default)]
    pub progress: f64,
    /// Playback position in seconds. Clamped to >= 0.
    #[serde(default)]
    pub watched_seconds: i64,
    /// Whether the caller considers the video finished.
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub video_id: Uuid,
    pub course_id: Uuid,
    /// Recomputed course percentage, absent when the caller is not
    /// enrolled in the course.
    pub course_completion_percentage: Option<f64>,
}

/// POST /api/videos/{video_id}/progress - Record a progress event.
///
/// The per-video row is upserted even when the caller is not enrolled in
/// the owning course; the course aggregate only moves for enrolled
/// callers.
pub async fn update_video_progress(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<ProgressResponse>> {
    let user_id = require_user(&req)?;
    let body: ProgressRequest = parse_json_body(req).await?;

    let update = state
        .metadata
        .record_video_progress(
            user_id.into_uuid(),
            video_id,
            body.watched_seconds,
            body.progress,
            body.completed,
            OffsetDateTime::now_utc(),
        )
        .await?;

    tracing::debug!(
        user_id = %user_id,
        video_id = %video_id,
        completed = body.completed,
        "Video progress recorded"
    );

    Ok(Json(ProgressResponse {
        video_id,
        course_id: update.course_id,
        course_completion_percentage: update.completion_percentage,
    }))
}
