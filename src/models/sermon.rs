// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sermon models: saved favorites, featured sermons and listed videos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sermon saved by a user (`users/{uid}/favorites/{videoId}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteSermon {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub video_id: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub saved_at: DateTime<Utc>,
}

/// Featured sermon shown on the home page (`featuredSermons`), admin-written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedSermon {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub pastor: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub order: i64,
}

/// A video from the uploads playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    /// Video ID (used as the favorite document ID)
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
}

impl VideoItem {
    /// Public watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}
