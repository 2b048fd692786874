//! Shared handler helpers and response shapes.

use crate::error::{ApiError, ApiResult};
use axum::extract::Request;
use lectern_metadata::models::{CourseRow, UserRow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Maximum request body size for JSON endpoints (64 KiB).
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Read and deserialize a JSON request body, enforcing the size limit.
pub async fn parse_json_body<T: DeserializeOwned>(req: Request) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

/// Format a timestamp as RFC 3339 for API responses.
pub fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// User account as exposed through the API. Never includes the password
/// hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_row(row: &UserRow) -> Self {
        Self {
            id: row.user_id,
            username: row.username.clone(),
            email: row.email.clone(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            is_admin: row.is_admin,
            is_active: row.is_active,
            created_at: rfc3339(row.created_at),
        }
    }
}

/// Course summary as exposed through the public catalog.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: Uuid,
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
    pub created_at: String,
    /// Whether the caller is enrolled. `None` for anonymous callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enrolled: Option<bool>,
    /// The caller's completion percentage. `None` when not enrolled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
}

impl CourseResponse {
    pub fn from_row(row: &CourseRow) -> Self {
        Self {
            id: row.course_id,
            title: row.title.clone(),
            description: row.description.clone(),
            thumbnail_url: row.thumbnail_url.clone(),
            category: row.category.clone(),
            difficulty: row.difficulty.clone(),
            duration_weeks: row.duration_weeks,
            instructor: row.instructor.clone(),
            average_rating: row.average_rating,
            enrolled_students: row.enrolled_students,
            is_featured: row.is_featured,
            created_at: rfc3339(row.created_at),
            is_enrolled: None,
            completion_percentage: None,
        }
    }
}
