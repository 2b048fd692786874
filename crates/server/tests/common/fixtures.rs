//! Shared test fixtures.

use super::server::TestServer;
use lectern_core::identity::UserId;
use lectern_metadata::models::{CourseRow, StageRow, UserRow, VideoRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Create a user account directly in the store and return it with a
/// signed access token.
#[allow(dead_code)]
pub async fn create_user(server: &TestServer, username: &str, is_admin: bool) -> (UserRow, String) {
    let user = UserRow {
        user_id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: lectern_server::auth::hash_password("fixture-password").unwrap(),
        first_name: None,
        last_name: None,
        is_admin,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };
    server.metadata().create_user(&user).await.unwrap();
    let token = token_for(server, user.user_id);
    (user, token)
}

/// Sign an access token for an existing user.
#[allow(dead_code)]
pub fn token_for(server: &TestServer, user_id: Uuid) -> String {
    lectern_server::auth::issue_token(&server.state.config.auth, UserId::from(user_id)).unwrap()
}

/// Sign an access token for the bootstrap admin account.
#[allow(dead_code)]
pub async fn admin_token(server: &TestServer) -> String {
    let admin = server
        .metadata()
        .get_user_by_username(&server.state.config.admin.username)
        .await
        .unwrap()
        .expect("bootstrap admin missing");
    token_for(server, admin.user_id)
}

/// Seed one active course with a single stage holding `video_count`
/// videos.
#[allow(dead_code)]
pub async fn seed_course(
    server: &TestServer,
    title: &str,
    category: &str,
    video_count: i64,
) -> (CourseRow, Vec<VideoRow>) {
    let now = OffsetDateTime::now_utc();
    let course = CourseRow {
        course_id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{title} description"),
        thumbnail_url: None,
        category: category.to_string(),
        difficulty: "Beginner".to_string(),
        duration_weeks: Some(4),
        instructor: Some("Test Instructor".to_string()),
        average_rating: 4.5,
        enrolled_students: 0,
        is_featured: false,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    server.metadata().create_course(&course).await.unwrap();

    let stage = StageRow {
        stage_id: Uuid::new_v4(),
        course_id: course.course_id,
        title: "Stage 1".to_string(),
        description: None,
        duration_hours: Some(2),
        order_index: 1,
        is_active: true,
        created_at: now,
    };
    server.metadata().create_stage(&stage).await.unwrap();

    let mut videos = Vec::new();
    for i in 1..=video_count {
        let video = VideoRow {
            video_id: Uuid::new_v4(),
            stage_id: stage.stage_id,
            title: format!("Video {i}"),
            media_id: format!("media-{i}"),
            order_index: i,
            duration_minutes: Some(10),
            description: None,
            is_active: true,
            created_at: now,
        };
        server.metadata().create_video(&video).await.unwrap();
        videos.push(video);
    }
    (course, videos)
}
