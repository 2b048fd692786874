//! Authentication and authorization middleware.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use lectern_core::config::AuthConfig;
use lectern_core::identity::{Identity, UserId};
use lectern_metadata::models::UserRow;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is sanitized: truncated to MAX_TRACE_ID_LEN characters and
    /// non-printable characters removed.
    pub fn from_client(value: &str) -> Self {
        // Limit by character count, not byte count, to safely handle
        // multi-byte UTF-8; then filter to ASCII-only for log safety.
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JWT payload for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Sign an access token for a user.
pub fn issue_token(config: &AuthConfig, user_id: UserId) -> ApiResult<String> {
    let now = OffsetDateTime::now_utc();
    let expires = now + config.token_ttl();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.unix_timestamp(),
        exp: expires.unix_timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Verify an access token and extract the user ID.
///
/// Returns `None` for any invalid, expired or malformed token; callers
/// decide whether that means anonymous access or a 401.
pub fn verify_token(config: &AuthConfig, token: &str) -> Option<UserId> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    UserId::parse(&data.claims.sub).ok()
}

/// Hash a password with argon2id.
///
/// Returns the PHC-formatted hash string that includes the salt and
/// parameters.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Authentication middleware that resolves the caller identity and sets up
/// trace context.
///
/// An absent or invalid credential resolves to `Identity::Anonymous`; the
/// request still proceeds. Handlers that require authentication enforce it
/// themselves via [`require_user`] or [`require_admin`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let trace_id_str = trace_id.0.clone();
    req.extensions_mut().insert(trace_id);

    let identity = extract_bearer_token(&req)
        .and_then(|token| verify_token(&state.config.auth, token))
        .map(Identity::Authenticated)
        .unwrap_or(Identity::Anonymous);
    req.extensions_mut().insert(identity);

    // Run the request within a tracing span that includes the trace ID
    let mut response = next
        .run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id_str))
        .await;

    // Echo the trace ID so clients can correlate their requests with logs.
    if let Ok(value) = HeaderValue::from_str(&trace_id_str) {
        response.headers_mut().insert("x-trace-id", value);
    }

    Ok(response)
}

/// Get the resolved caller identity from request extensions.
pub fn get_identity(req: &Request) -> Identity {
    req.extensions()
        .get::<Identity>()
        .copied()
        .unwrap_or(Identity::Anonymous)
}

/// Require an authenticated caller, returning the user ID.
pub fn require_user(req: &Request) -> ApiResult<UserId> {
    get_identity(req)
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
}

/// Require an authenticated, active admin caller and load its account row.
///
/// A token for a deleted or deactivated account is rejected even though the
/// signature still verifies.
// Not an `async fn`: capturing `&Request` in the future would make it
// `!Send` (the request body is `!Sync`), which breaks axum's handler bound.
pub fn require_admin<'a>(
    state: &'a AppState,
    req: &Request,
) -> impl std::future::Future<Output = ApiResult<UserRow>> + Send + 'a {
    let user_id = require_user(req);
    async move {
        let user_id = user_id?;
        require_admin_inner(state, user_id).await
    }
}

async fn require_admin_inner(state: &AppState, user_id: UserId) -> ApiResult<UserRow> {
    let user = state
        .metadata
        .get_user(user_id.into_uuid())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;
    if !user.is_active {
        return Err(ApiError::Unauthorized("account is deactivated".to_string()));
    }
    if !user.is_admin {
        return Err(ApiError::Forbidden("admin access required".to_string()));
    }
    Ok(user)
}
