//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/api/health", get(handlers::health_check))
        // Accounts and sessions
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/me", get(handlers::me))
        // Catalog reads (anonymous access allowed)
        .route("/api/courses", get(handlers::list_courses))
        .route("/api/courses/{course_id}", get(handlers::get_course))
        .route("/api/categories", get(handlers::list_categories))
        // Enrollment and progress (authenticated)
        .route("/api/courses/{course_id}/enroll", post(handlers::enroll_course))
        .route(
            "/api/videos/{video_id}/progress",
            post(handlers::update_video_progress),
        )
        .route("/api/dashboard", get(handlers::dashboard))
        // Admin endpoints (all require an admin account)
        .route("/api/admin/users", get(handlers::list_users))
        .route(
            "/api/admin/users/{user_id}",
            get(handlers::get_user_detail).put(handlers::update_user),
        )
        .route("/api/admin/courses", get(handlers::list_all_courses))
        .route(
            "/api/admin/courses/{course_id}/toggle-active",
            post(handlers::toggle_course_active),
        )
        .route(
            "/api/admin/courses/{course_id}/toggle-featured",
            post(handlers::toggle_course_featured),
        );

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: TraceLayer -> Auth -> Handler
    api_routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
