// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile page and settings.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::i18n;
use crate::models::{UserProfile, UserSettings};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Profile with the activity counts shown under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub favorites_count: usize,
    pub prayer_requests_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Partial settings change; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub dark_mode: Option<bool>,
    pub daily_verse_reminder: Option<bool>,
    pub live_stream_alerts: Option<bool>,
    pub special_events: Option<bool>,
    pub language: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: FirestoreDb,
}

impl ProfileService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    pub async fn profile(&self, user_id: &str) -> Result<ProfileView, AppError> {
        let (profile, favorites, prayers) = tokio::join!(
            self.db.get_user(user_id),
            self.db.count_favorites(user_id),
            self.db.count_prayers_for_user(user_id),
        );

        let profile = profile?.ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

        Ok(ProfileView {
            profile,
            favorites_count: favorites?,
            prayer_requests_count: prayers?,
        })
    }

    /// Change display name and/or photo URL.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        let display_name = update
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let photo_url = update
            .photo_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if display_name.is_none() && photo_url.is_none() {
            return Err(AppError::BadRequest(
                "Enter a display name or choose a photo.".to_string(),
            ));
        }

        self.db
            .update_profile_fields(user_id, display_name, photo_url)
            .await?;
        tracing::info!(user_id, "Profile updated");
        Ok(())
    }

    /// Stored settings merged over the defaults.
    pub async fn settings(&self, user_id: &str) -> Result<UserSettings, AppError> {
        let stored = self.db.get_user_settings_raw(user_id).await?;
        Ok(UserSettings::from_stored(stored.as_ref()))
    }

    /// Apply a partial change and return the resulting settings.
    pub async fn update_settings(
        &self,
        user_id: &str,
        update: &SettingsUpdate,
    ) -> Result<UserSettings, AppError> {
        if let Some(language) = &update.language {
            if !i18n::is_supported(language) {
                return Err(AppError::BadRequest(format!(
                    "Unsupported language: {}",
                    language
                )));
            }
        }

        let (paths, object) = update.changes();
        self.db
            .merge_settings(user_id, &paths, &object)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id, error = %e, "Could not save setting");
            })?;
        self.settings(user_id).await
    }
}

impl SettingsUpdate {
    /// Field paths under `settings` this update touches, and the values to
    /// write there.
    fn changes(&self) -> (Vec<&'static str>, Value) {
        let mut paths = Vec::new();
        let mut changed = Map::new();
        let flags = [
            ("darkMode", "settings.darkMode", self.dark_mode),
            (
                "dailyVerseReminder",
                "settings.dailyVerseReminder",
                self.daily_verse_reminder,
            ),
            (
                "liveStreamAlerts",
                "settings.liveStreamAlerts",
                self.live_stream_alerts,
            ),
            ("specialEvents", "settings.specialEvents", self.special_events),
        ];
        for (key, path, value) in flags {
            if let Some(value) = value {
                paths.push(path);
                changed.insert(key.to_string(), Value::from(value));
            }
        }
        if let Some(language) = &self.language {
            paths.push("settings.language");
            changed.insert("language".to_string(), Value::from(language.as_str()));
        }
        (paths, json!({ "settings": changed }))
    }
}
