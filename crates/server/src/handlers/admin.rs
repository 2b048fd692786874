//! Administrative endpoints.

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{UserResponse, parse_json_body, rfc3339};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use lectern_core::MAX_PERCENT;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Health check.
///
/// Intentionally unauthenticated to support load balancer and k8s probes.
/// Returns only non-sensitive information (status and version).
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminUserSummary {
    #[serde(flatten)]
    pub user: UserResponse,
    pub enrollments_count: usize,
    pub completed_courses: usize,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<AdminUserSummary>,
}

/// GET /api/admin/users - List all accounts with enrollment stats.
pub async fn list_users(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<UserListResponse>> {
    require_admin(&state, &req).await?;

    let mut users = Vec::new();
    for row in state.metadata.list_users().await? {
        let enrollments = state
            .metadata
            .list_enrollments_for_user(row.user_id)
            .await?;
        let completed = enrollments
            .iter()
            .filter(|e| e.completion_percentage >= MAX_PERCENT)
            .count();
        users.push(AdminUserSummary {
            user: UserResponse::from_row(&row),
            enrollments_count: enrollments.len(),
            completed_courses: completed,
        });
    }

    Ok(Json(UserListResponse { users }))
}

#[derive(Debug, Serialize)]
pub struct AdminEnrollment {
    pub course_id: Uuid,
    pub course_title: String,
    pub course_category: String,
    pub completion_percentage: f64,
    pub enrolled_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub enrollments: Vec<AdminEnrollment>,
}

/// GET /api/admin/users/{user_id} - Account detail with its enrollments.
pub async fn get_user_detail(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<UserDetailResponse>> {
    require_admin(&state, &req).await?;

    let user = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    let mut enrollments = Vec::new();
    for enrollment in state.metadata.list_enrollments_for_user(user_id).await? {
        let Some(course) = state.metadata.get_course(enrollment.course_id).await? else {
            continue;
        };
        enrollments.push(AdminEnrollment {
            course_id: course.course_id,
            course_title: course.title,
            course_category: course.category,
            completion_percentage: enrollment.completion_percentage,
            enrolled_at: rfc3339(enrollment.enrolled_at),
            last_accessed: rfc3339(enrollment.last_accessed),
        });
    }

    Ok(Json(UserDetailResponse {
        user: UserResponse::from_row(&user),
        enrollments,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

/// PUT /api/admin/users/{user_id} - Update an account's editable fields.
///
/// An admin cannot revoke its own admin flag or deactivate itself;
/// otherwise a sole admin could lock everyone out of the admin surface.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<UserResponse>> {
    let caller = require_admin(&state, &req).await?;
    let body: UpdateUserRequest = parse_json_body(req).await?;

    let mut user = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if caller.user_id == user_id {
        if body.is_admin == Some(false) {
            return Err(ApiError::BadRequest(
                "cannot remove your own admin access".to_string(),
            ));
        }
        if body.is_active == Some(false) {
            return Err(ApiError::BadRequest(
                "cannot deactivate your own account".to_string(),
            ));
        }
    }

    if let Some(first_name) = body.first_name {
        user.first_name = Some(first_name);
    }
    if let Some(last_name) = body.last_name {
        user.last_name = Some(last_name);
    }
    if let Some(is_admin) = body.is_admin {
        user.is_admin = is_admin;
    }
    if let Some(is_active) = body.is_active {
        user.is_active = is_active;
    }

    state.metadata.update_user(&user).await?;
    tracing::info!(user_id = %user_id, admin = %caller.username, "User updated");

    Ok(Json(UserResponse::from_row(&user)))
}

#[derive(Debug, Serialize)]
pub struct AdminCourseSummary {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub instructor: Option<String>,
    pub enrolled_students: i64,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminCourseListResponse {
    pub courses: Vec<AdminCourseSummary>,
}

/// GET /api/admin/courses - List all courses including inactive ones.
pub async fn list_all_courses(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<AdminCourseListResponse>> {
    require_admin(&state, &req).await?;

    let courses = state
        .metadata
        .list_all_courses()
        .await?
        .iter()
        .map(|row| AdminCourseSummary {
            id: row.course_id,
            title: row.title.clone(),
            category: row.category.clone(),
            difficulty: row.difficulty.clone(),
            instructor: row.instructor.clone(),
            enrolled_students: row.enrolled_students,
            is_featured: row.is_featured,
            is_active: row.is_active,
            created_at: rfc3339(row.created_at),
            updated_at: rfc3339(row.updated_at),
        })
        .collect();

    Ok(Json(AdminCourseListResponse { courses }))
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub course_id: Uuid,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// POST /api/admin/courses/{course_id}/toggle-active - Flip a course's
/// active flag.
pub async fn toggle_course_active(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<ToggleResponse>> {
    require_admin(&state, &req).await?;

    let course = state
        .metadata
        .get_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("course not found".to_string()))?;

    let is_active = !course.is_active;
    state
        .metadata
        .set_course_active(course_id, is_active, OffsetDateTime::now_utc())
        .await?;
    tracing::info!(course_id = %course_id, is_active, "Course active flag toggled");

    Ok(Json(ToggleResponse {
        course_id,
        is_active: Some(is_active),
        is_featured: None,
    }))
}

/// POST /api/admin/courses/{course_id}/toggle-featured - Flip a course's
/// featured flag.
pub async fn toggle_course_featured(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<ToggleResponse>> {
    require_admin(&state, &req).await?;

    let course = state
        .metadata
        .get_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("course not found".to_string()))?;

    let is_featured = !course.is_featured;
    state
        .metadata
        .set_course_featured(course_id, is_featured, OffsetDateTime::now_utc())
        .await?;
    tracing::info!(course_id = %course_id, is_featured, "Course featured flag toggled");

    Ok(Json(ToggleResponse {
        course_id,
        is_active: None,
        is_featured: Some(is_featured),
    }))
}
