//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database file.
    Sqlite {
        /// Path to the database file.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/lectern.db"),
        }
    }
}

/// Authentication configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens (HS256).
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 3600 // 7 days
}

impl AuthConfig {
    /// Token lifetime as a Duration, saturating at i64::MAX seconds.
    pub fn token_ttl(&self) -> Duration {
        let secs = i64::try_from(self.token_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs)
    }

    /// Create a test configuration with a fixed signing secret.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            jwt_secret: "test-jwt-secret-do-not-use-in-production".to_string(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// Bootstrap admin account configuration.
///
/// The admin account is created on first startup if it does not already
/// exist. It provides initial access to the admin surface (user and course
/// management).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin username.
    pub username: String,
    /// Admin email address.
    pub email: String,
    /// Initial admin password (hashed with argon2id before storage).
    pub password: String,
}

impl AdminConfig {
    /// Create a test configuration with a well-known password.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@lectern.test".to_string(),
            password: "test-admin-password".to_string(),
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Create a test configuration. Storage paths are placeholders; tests
    /// construct their stores directly.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            metadata: MetadataConfig::Sqlite {
                path: PathBuf::from(":memory:"),
            },
            auth: AuthConfig::for_testing(),
            admin: AdminConfig::for_testing(),
        }
    }
}
