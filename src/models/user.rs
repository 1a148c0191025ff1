//! User, session and credential models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User profile stored in Firestore (`users/{uid}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth user ID (also used as document ID)
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub mobile_number: String,
    pub email: String,
    /// "First Last" unless edited on the profile page
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-user preferences stored under `users/{uid}.settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub dark_mode: bool,
    pub daily_verse_reminder: bool,
    pub live_stream_alerts: bool,
    pub special_events: bool,
    pub language: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            daily_verse_reminder: true,
            live_stream_alerts: true,
            special_events: false,
            language: "en".to_string(),
        }
    }
}

impl UserSettings {
    /// Merge whatever is stored over the defaults.
    ///
    /// Each key is checked on its own: a missing or mistyped value keeps its
    /// default instead of failing the whole read.
    pub fn from_stored(stored: Option<&Value>) -> Self {
        let mut settings = Self::default();
        let Some(map) = stored.and_then(Value::as_object) else {
            return settings;
        };

        let flag = |key: &str, current: bool| {
            map.get(key).and_then(Value::as_bool).unwrap_or(current)
        };
        settings.dark_mode = flag("darkMode", settings.dark_mode);
        settings.daily_verse_reminder = flag("dailyVerseReminder", settings.daily_verse_reminder);
        settings.live_stream_alerts = flag("liveStreamAlerts", settings.live_stream_alerts);
        settings.special_events = flag("specialEvents", settings.special_events);
        if let Some(language) = map.get("language").and_then(Value::as_str) {
            settings.language = language.to_string();
        }
        settings
    }
}

/// Login credentials, keyed by normalized email (`credentials/{email}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_id: String,
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

/// Open session (`sessions/{sid}`). Deleting it signs the session out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub user_id: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One-time password reset token, keyed by the SHA-256 of the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub user_id: String,
    pub email: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_default_when_absent() {
        assert_eq!(UserSettings::from_stored(None), UserSettings::default());
        assert!(UserSettings::default().dark_mode);
    }

    #[test]
    fn test_settings_merge_ignores_mistyped_values() {
        let stored = json!({ "darkMode": "yes", "specialEvents": true, "language": "kn" });
        let settings = UserSettings::from_stored(Some(&stored));
        assert!(settings.dark_mode, "mistyped darkMode keeps the default");
        assert!(settings.special_events);
        assert_eq!(settings.language, "kn");
    }
}
