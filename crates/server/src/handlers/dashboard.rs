//! Learner dashboard endpoint.

use crate::auth::require_user;
use crate::error::ApiResult;
use crate::handlers::common::rfc3339;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use lectern_core::MAX_PERCENT;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DashboardCourse {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub completion_percentage: f64,
    pub enrolled_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    pub not_started_courses: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub enrolled_courses: Vec<DashboardCourse>,
    pub stats: DashboardStats,
}

/// GET /api/dashboard - The caller's enrolled courses with progress stats.
///
/// Enrollments whose course has since been deactivated are filtered out of
/// the view; the ledger rows themselves are kept.
pub async fn dashboard(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<DashboardResponse>> {
    let user_id = require_user(&req)?;

    let mut enrolled_courses = Vec::new();
    for enrollment in state
        .metadata
        .list_enrollments_for_user(user_id.into_uuid())
        .await?
    {
        let Some(course) = state.metadata.get_course(enrollment.course_id).await? else {
            continue;
        };
        if !course.is_active {
            continue;
        }
        enrolled_courses.push(DashboardCourse {
            id: course.course_id,
            title: course.title,
            thumbnail_url: course.thumbnail_url,
            category: course.category,
            completion_percentage: enrollment.completion_percentage,
            enrolled_at: rfc3339(enrollment.enrolled_at),
            last_accessed: rfc3339(enrollment.last_accessed),
        });
    }

    let total = enrolled_courses.len();
    let completed = enrolled_courses
        .iter()
        .filter(|c| c.completion_percentage >= MAX_PERCENT)
        .count();
    let in_progress = enrolled_courses
        .iter()
        .filter(|c| c.completion_percentage > 0.0 && c.completion_percentage < MAX_PERCENT)
        .count();

    Ok(Json(DashboardResponse {
        enrolled_courses,
        stats: DashboardStats {
            total_courses: total,
            completed_courses: completed,
            in_progress_courses: in_progress,
            not_started_courses: total - completed - in_progress,
        },
    }))
}
