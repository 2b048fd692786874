//! First-start initialization: admin account and catalog seeding.

use crate::auth::hash_password;
use anyhow::{Context, Result};
use lectern_core::catalog::{CourseSeed, StageSeed, VideoSeed};
use lectern_core::config::AdminConfig;
use lectern_metadata::MetadataStore;
use lectern_metadata::models::{CourseRow, StageRow, UserRow, VideoRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Ensure the configured admin account exists.
///
/// Runs on every startup; if an account with the configured username
/// already exists it is left untouched (including its password), so a
/// changed config password does not silently rotate credentials.
pub async fn ensure_admin_user(metadata: &dyn MetadataStore, config: &AdminConfig) -> Result<()> {
    if let Some(existing) = metadata.get_user_by_username(&config.username).await? {
        if !existing.is_admin {
            anyhow::bail!(
                "configured admin username '{}' belongs to a non-admin account",
                config.username
            );
        }
        tracing::debug!("Admin account already exists");
        return Ok(());
    }

    let user = UserRow {
        user_id: Uuid::new_v4(),
        username: config.username.clone(),
        email: config.email.clone(),
        password_hash: hash_password(&config.password)
            .context("failed to hash admin password")?,
        first_name: None,
        last_name: None,
        is_admin: true,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };
    metadata.create_user(&user).await?;
    tracing::info!(user_id = %user.user_id, username = %user.username, "Admin account created");

    Ok(())
}

/// Seed the catalog with the default course set if the store is empty.
///
/// Returns the number of courses inserted (0 when the catalog already has
/// content).
pub async fn seed_catalog(metadata: &dyn MetadataStore) -> Result<usize> {
    if metadata.count_courses().await? > 0 {
        tracing::debug!("Catalog already seeded");
        return Ok(0);
    }

    let seeds = default_catalog();
    let now = OffsetDateTime::now_utc();
    let mut inserted = 0;

    for seed in &seeds {
        seed.validate().context("invalid catalog seed")?;

        let course = CourseRow {
            course_id: Uuid::new_v4(),
            title: seed.title.clone(),
            description: seed.description.clone(),
            thumbnail_url: seed.thumbnail_url.clone(),
            category: seed.category.clone(),
            difficulty: seed.difficulty.clone(),
            duration_weeks: seed.duration_weeks,
            instructor: seed.instructor.clone(),
            average_rating: seed.average_rating,
            enrolled_students: 0,
            is_featured: seed.is_featured,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        metadata.create_course(&course).await?;

        for (stage_pos, stage_seed) in seed.stages.iter().enumerate() {
            let stage = StageRow {
                stage_id: Uuid::new_v4(),
                course_id: course.course_id,
                title: stage_seed.title.clone(),
                description: stage_seed.description.clone(),
                duration_hours: stage_seed.duration_hours,
                order_index: stage_pos as i64 + 1,
                is_active: true,
                created_at: now,
            };
            metadata.create_stage(&stage).await?;

            for (video_pos, video_seed) in stage_seed.videos.iter().enumerate() {
                let video = VideoRow {
                    video_id: Uuid::new_v4(),
                    stage_id: stage.stage_id,
                    title: video_seed.title.clone(),
                    media_id: video_seed.media_id.clone(),
                    order_index: video_pos as i64 + 1,
                    duration_minutes: video_seed.duration_minutes,
                    description: video_seed.description.clone(),
                    is_active: true,
                    created_at: now,
                };
                metadata.create_video(&video).await?;
            }
        }
        inserted += 1;
    }

    tracing::info!(courses = inserted, "Catalog seeded");
    Ok(inserted)
}

fn video(title: &str, media_id: &str, duration_minutes: i64) -> VideoSeed {
    VideoSeed {
        title: title.to_string(),
        media_id: media_id.to_string(),
        duration_minutes: Some(duration_minutes),
        description: None,
    }
}

/// The default course catalog, inserted on first startup.
fn default_catalog() -> Vec<CourseSeed> {
    vec![
        CourseSeed {
            title: "Web Development Mastery".to_string(),
            description: "Learn modern web development with React, Node.js, and database \
                          integration"
                .to_string(),
            category: "Development".to_string(),
            difficulty: "Beginner".to_string(),
            duration_weeks: Some(12),
            thumbnail_url: Some("/assets/thumbnails/web_development.png".to_string()),
            instructor: Some("Mike Johnson".to_string()),
            average_rating: 4.9,
            is_featured: true,
            stages: vec![
                StageSeed {
                    title: "Introduction to Web Development".to_string(),
                    description: Some(
                        "Get started with the basics of web development".to_string(),
                    ),
                    duration_hours: Some(2),
                    videos: vec![
                        video("What is Web Development?", "dQw4w9WgXcQ", 15),
                        video("Setting Up Your Environment", "dQw4w9WgXcQ", 22),
                        video("Your First HTML Page", "dQw4w9WgXcQ", 18),
                    ],
                },
                StageSeed {
                    title: "HTML Fundamentals".to_string(),
                    description: Some(
                        "Master HTML structure and semantic elements".to_string(),
                    ),
                    duration_hours: Some(3),
                    videos: vec![
                        video("HTML Structure and Tags", "dQw4w9WgXcQ", 25),
                        video("Forms and Input Elements", "dQw4w9WgXcQ", 30),
                        video("Semantic HTML", "dQw4w9WgXcQ", 20),
                    ],
                },
            ],
        },
        CourseSeed {
            title: "Blog Development".to_string(),
            description: "Create engaging blogs with modern CMS and content strategies"
                .to_string(),
            category: "Development".to_string(),
            difficulty: "Beginner".to_string(),
            duration_weeks: Some(6),
            thumbnail_url: Some("/assets/thumbnails/blog_development.png".to_string()),
            instructor: Some("Sarah Wilson".to_string()),
            average_rating: 4.7,
            is_featured: false,
            stages: vec![StageSeed {
                title: "Blog Basics".to_string(),
                description: Some("Understanding blog fundamentals".to_string()),
                duration_hours: Some(2),
                videos: vec![
                    video("What Makes a Great Blog?", "dQw4w9WgXcQ", 20),
                    video("Choosing Your Niche", "dQw4w9WgXcQ", 25),
                ],
            }],
        },
        CourseSeed {
            title: "Trading & Finance".to_string(),
            description: "Master trading strategies, technical analysis, and risk management"
                .to_string(),
            category: "Finance".to_string(),
            difficulty: "Intermediate".to_string(),
            duration_weeks: Some(8),
            thumbnail_url: Some("/assets/thumbnails/trading.png".to_string()),
            instructor: Some("David Chen".to_string()),
            average_rating: 4.8,
            is_featured: true,
            stages: vec![StageSeed {
                title: "Trading Fundamentals".to_string(),
                description: Some("Learn the basics of trading".to_string()),
                duration_hours: Some(3),
                videos: vec![
                    video("Introduction to Trading", "dQw4w9WgXcQ", 30),
                    video("Market Analysis", "dQw4w9WgXcQ", 35),
                ],
            }],
        },
        CourseSeed {
            title: "Blockchain & Web3".to_string(),
            description: "Understand blockchain technology, smart contracts, and DeFi"
                .to_string(),
            category: "Technology".to_string(),
            difficulty: "Advanced".to_string(),
            duration_weeks: Some(10),
            thumbnail_url: Some("/assets/thumbnails/blockchain_web3.png".to_string()),
            instructor: Some("Alex Rodriguez".to_string()),
            average_rating: 4.6,
            is_featured: false,
            stages: vec![StageSeed {
                title: "Blockchain Basics".to_string(),
                description: Some("Understanding blockchain technology".to_string()),
                duration_hours: Some(4),
                videos: vec![
                    video("What is Blockchain?", "dQw4w9WgXcQ", 25),
                    video("Cryptocurrency Fundamentals", "dQw4w9WgXcQ", 30),
                ],
            }],
        },
        CourseSeed {
            title: "Digital Marketing".to_string(),
            description: "Learn SEO, social media marketing, and digital advertising strategies"
                .to_string(),
            category: "Marketing".to_string(),
            difficulty: "Beginner".to_string(),
            duration_weeks: Some(8),
            thumbnail_url: Some("/assets/thumbnails/marketing.png".to_string()),
            instructor: Some("Emma Thompson".to_string()),
            average_rating: 4.8,
            is_featured: true,
            stages: vec![StageSeed {
                title: "Marketing Fundamentals".to_string(),
                description: Some("Learn the basics of digital marketing".to_string()),
                duration_hours: Some(3),
                videos: vec![
                    video("Introduction to Digital Marketing", "dQw4w9WgXcQ", 20),
                    video("Understanding Your Audience", "dQw4w9WgXcQ", 25),
                ],
            }],
        },
        CourseSeed {
            title: "Online Writing".to_string(),
            description: "Master copywriting, content creation, and freelance writing skills"
                .to_string(),
            category: "Writing".to_string(),
            difficulty: "Beginner".to_string(),
            duration_weeks: Some(6),
            thumbnail_url: Some("/assets/thumbnails/online_writing.png".to_string()),
            instructor: Some("Lisa Garcia".to_string()),
            average_rating: 4.7,
            is_featured: false,
            stages: vec![StageSeed {
                title: "Writing Fundamentals".to_string(),
                description: Some("Learn the basics of effective writing".to_string()),
                duration_hours: Some(2),
                videos: vec![
                    video("Writing for the Web", "dQw4w9WgXcQ", 22),
                    video("Finding Your Voice", "dQw4w9WgXcQ", 18),
                ],
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_seeds_are_valid() {
        let seeds = default_catalog();
        assert!(!seeds.is_empty());
        for seed in &seeds {
            seed.validate().unwrap();
            assert!(seed.video_count() > 0);
        }
    }
}
