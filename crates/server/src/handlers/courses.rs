//! Public catalog and enrollment endpoints.

use crate::auth::{get_identity, require_user};
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{CourseResponse, rfc3339};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use lectern_metadata::models::{EnrollmentRow, VideoProgressRow};
use serde::Serialize;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
}

/// GET /api/courses - List active courses.
///
/// Anonymous callers get the plain catalog; authenticated callers
/// additionally see their enrollment state per course.
pub async fn list_courses(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<CourseListResponse>> {
    let rows = state.metadata.list_active_courses().await?;

    let enrollments: HashMap<Uuid, f64> = match get_identity(&req).user_id() {
        Some(user_id) => state
            .metadata
            .list_enrollments_for_user(user_id.into_uuid())
            .await?
            .into_iter()
            .map(|e| (e.course_id, e.completion_percentage))
            .collect(),
        None => HashMap::new(),
    };
    let authenticated = get_identity(&req).is_authenticated();

    let courses = rows
        .iter()
        .map(|row| {
            let mut course = CourseResponse::from_row(row);
            if authenticated {
                let pct = enrollments.get(&row.course_id).copied();
                course.is_enrolled = Some(pct.is_some());
                course.completion_percentage = pct;
            }
            course
        })
        .collect();

    Ok(Json(CourseListResponse { courses }))
}

#[derive(Debug, Serialize)]
pub struct VideoProgressResponse {
    pub completed: bool,
    pub progress_percent: f64,
    pub watched_seconds: i64,
    pub last_watched: Option<String>,
}

impl VideoProgressResponse {
    fn from_row(row: Option<&VideoProgressRow>) -> Self {
        match row {
            Some(p) => Self {
                completed: p.completed,
                progress_percent: p.progress_percent,
                watched_seconds: p.watched_seconds,
                last_watched: Some(rfc3339(p.last_watched)),
            },
            // Untouched videos read as zero progress.
            None => Self {
                completed: false,
                progress_percent: 0.0,
                watched_seconds: 0,
                last_watched: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub media_id: String,
    pub order_index: i64,
    pub duration_minutes: Option<i64>,
    pub description: Option<String>,
    /// Present only for authenticated, enrolled callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<VideoProgressResponse>,
}

#[derive(Debug, Serialize)]
pub struct StageDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration_hours: Option<i64>,
    pub order_index: i64,
    pub videos: Vec<VideoDetail>,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub course_id: Uuid,
    pub enrolled_at: String,
    pub completion_percentage: f64,
    pub last_accessed: String,
}

impl EnrollmentResponse {
    fn from_row(row: &EnrollmentRow) -> Self {
        Self {
            course_id: row.course_id,
            enrolled_at: rfc3339(row.enrolled_at),
            completion_percentage: row.completion_percentage,
            last_accessed: rfc3339(row.last_accessed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    pub stages: Vec<StageDetail>,
    pub enrolled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentResponse>,
}

/// GET /api/courses/{course_id} - Course detail with its ordered stages
/// and videos.
///
/// Enrolled callers get their per-video progress overlaid on the
/// hierarchy.
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<CourseDetailResponse>> {
    let row = state
        .metadata
        .get_course(course_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| ApiError::NotFound("course not found".to_string()))?;

    let user_id = get_identity(&req).user_id();
    let enrollment = match user_id {
        Some(user_id) => {
            state
                .metadata
                .get_enrollment(user_id.into_uuid(), course_id)
                .await?
        }
        None => None,
    };

    // Per-video progress is only overlaid for enrolled callers.
    let progress: HashMap<Uuid, VideoProgressRow> = match (user_id, enrollment.is_some()) {
        (Some(user_id), true) => state
            .metadata
            .list_progress_for_course(user_id.into_uuid(), course_id)
            .await?
            .into_iter()
            .map(|p| (p.video_id, p))
            .collect(),
        _ => HashMap::new(),
    };
    let enrolled = enrollment.is_some();

    let mut stages = Vec::new();
    for stage in state.metadata.list_active_stages(course_id).await? {
        let videos = state
            .metadata
            .list_active_videos(stage.stage_id)
            .await?
            .into_iter()
            .map(|v| VideoDetail {
                id: v.video_id,
                title: v.title,
                media_id: v.media_id,
                order_index: v.order_index,
                duration_minutes: v.duration_minutes,
                description: v.description,
                progress: enrolled
                    .then(|| VideoProgressResponse::from_row(progress.get(&v.video_id))),
            })
            .collect();
        stages.push(StageDetail {
            id: stage.stage_id,
            title: stage.title,
            description: stage.description,
            duration_hours: stage.duration_hours,
            order_index: stage.order_index,
            videos,
        });
    }

    let mut course = CourseResponse::from_row(&row);
    if user_id.is_some() {
        course.is_enrolled = Some(enrolled);
        course.completion_percentage = enrollment.as_ref().map(|e| e.completion_percentage);
    }

    Ok(Json(CourseDetailResponse {
        course,
        stages,
        enrolled,
        enrollment: enrollment.as_ref().map(EnrollmentResponse::from_row),
    }))
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// GET /api/categories - Sorted distinct categories of active courses.
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state.metadata.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// POST /api/courses/{course_id}/enroll - Enroll the caller in a course.
pub async fn enroll_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    req: Request,
) -> ApiResult<(StatusCode, Json<EnrollmentResponse>)> {
    let user_id = require_user(&req)?;
    let enrollment = state
        .metadata
        .enroll(user_id.into_uuid(), course_id, OffsetDateTime::now_utc())
        .await?;
    tracing::info!(user_id = %user_id, course_id = %course_id, "User enrolled");

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse::from_row(&enrollment)),
    ))
}
