//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT signing key, video API key) are injected as environment
//! variables by the deployment and read once at startup.

use std::env;
use std::time::Duration;

const DEFAULT_VERSE_API_URL: &str = "https://beta.ourmanna.com/api/v1";
const DEFAULT_TRANSLATION_API_URL: &str = "https://api.mymemory.translated.net";
const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_PLAYLIST_ID: &str = "UUxxxxxxxxxxxxxxxxxxxxxx";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Verse-of-the-day API base URL
    pub verse_api_url: String,
    /// Translation API base URL
    pub translation_api_url: String,
    /// Video listing API base URL
    pub youtube_api_url: String,
    /// Uploads playlist listed on the sermons page
    pub youtube_playlist_id: String,
    /// Lifetime of cached reference data (announcements, events, ...)
    pub cache_ttl: Duration,
    /// Re-poll interval for live prayer snapshots (never zero)
    pub snapshot_poll_interval: Duration,
    /// HTTP mail relay that delivers account mail; unset means log only
    pub mail_relay_url: Option<String>,
    /// Sender address on account mail
    pub mail_from: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Video listing API key
    pub youtube_api_key: String,
    /// Bearer token for the mail relay
    pub mail_relay_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self::test_default()
    }
}

impl Config {
    /// Configuration used by tests: local URLs, short intervals, fixed key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            verse_api_url: "http://127.0.0.1:9".to_string(),
            translation_api_url: "http://127.0.0.1:9".to_string(),
            youtube_api_url: "http://127.0.0.1:9".to_string(),
            youtube_playlist_id: "test_playlist".to_string(),
            cache_ttl: Duration::from_secs(60),
            snapshot_poll_interval: Duration::from_millis(200),
            mail_relay_url: None,
            mail_from: "office@example.org".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            youtube_api_key: "test_api_key".to_string(),
            mail_relay_key: String::new(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            verse_api_url: env_or("VERSE_API_URL", DEFAULT_VERSE_API_URL),
            translation_api_url: env_or("TRANSLATION_API_URL", DEFAULT_TRANSLATION_API_URL),
            youtube_api_url: env_or("YOUTUBE_API_URL", DEFAULT_YOUTUBE_API_URL),
            youtube_playlist_id: env_or("YOUTUBE_PLAYLIST_ID", DEFAULT_PLAYLIST_ID),
            cache_ttl: Duration::from_secs(secs_or("CACHE_TTL_SECS", 300)?),
            snapshot_poll_interval: Duration::from_secs(positive_secs_or(
                "SNAPSHOT_POLL_SECS",
                15,
            )?),
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            mail_from: env_or("MAIL_FROM", "no-reply@localhost"),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            youtube_api_key: env::var("YOUTUBE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("YOUTUBE_API_KEY"))?,
            mail_relay_key: env::var("MAIL_RELAY_KEY").unwrap_or_default(),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| default.to_string())
}

fn secs_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    parse_secs(name, env::var(name).ok(), default)
}

/// Like `secs_or`, but zero is rejected.
fn positive_secs_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parse_secs(name, env::var(name).ok(), default)? {
        0 => Err(ConfigError::Invalid(name, "0".to_string())),
        secs => Ok(secs),
    }
}

fn parse_secs(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
