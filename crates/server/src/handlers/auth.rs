//! Account and session endpoints.

use crate::auth::{hash_password, issue_token, require_user, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{UserResponse, parse_json_body};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use lectern_core::identity::UserId;
use lectern_metadata::models::UserRow;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let body: RegisterRequest = parse_json_body(req).await?;

    let username = body.username.trim();
    let email = body.email.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".to_string()));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.metadata.get_user_by_username(username).await?.is_some() {
        return Err(ApiError::Conflict("username is already taken".to_string()));
    }
    if state.metadata.get_user_by_email(email).await?.is_some() {
        return Err(ApiError::Conflict("email is already registered".to_string()));
    }

    let user = UserRow {
        user_id: UserId::new().into_uuid(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(&body.password)?,
        first_name: body.first_name,
        last_name: body.last_name,
        is_admin: false,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };
    state.metadata.create_user(&user).await?;
    tracing::info!(user_id = %user.user_id, username = %user.username, "User registered");

    let token = issue_token(&state.config.auth, UserId::from(user.user_id))?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            user: UserResponse::from_row(&user),
        }),
    ))
}

/// POST /api/auth/login - Exchange credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<SessionResponse>> {
    let body: LoginRequest = parse_json_body(req).await?;
    let handle = body.username.trim();

    // The handle may be either a username or an email address.
    let user = match state.metadata.get_user_by_username(handle).await? {
        Some(user) => Some(user),
        None => state.metadata.get_user_by_email(handle).await?,
    };

    // Same error for unknown user and bad password, to avoid leaking which
    // usernames exist.
    let invalid = || ApiError::Unauthorized("invalid username or password".to_string());
    let user = user.ok_or_else(invalid)?;
    if !verify_password(&body.password, &user.password_hash)? {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized("account is deactivated".to_string()));
    }

    let token = issue_token(&state.config.auth, UserId::from(user.user_id))?;
    Ok(Json(SessionResponse {
        token,
        user: UserResponse::from_row(&user),
    }))
}

/// GET /api/auth/me - Return the authenticated account.
pub async fn me(State(state): State<AppState>, req: Request) -> ApiResult<Json<UserResponse>> {
    let user_id = require_user(&req)?;
    let user = state
        .metadata
        .get_user(user_id.into_uuid())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;
    Ok(Json(UserResponse::from_row(&user)))
}
