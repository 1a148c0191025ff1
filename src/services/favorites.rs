// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved sermons.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{FavoriteSermon, VideoItem};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleResult {
    Saved,
    Removed,
}

impl ToggleResult {
    pub fn message(self) -> &'static str {
        match self {
            ToggleResult::Saved => "Sermon saved to your favorites.",
            ToggleResult::Removed => "Sermon removed from favorites.",
        }
    }
}

#[derive(Clone)]
pub struct FavoritesService {
    db: FirestoreDb,
}

impl FavoritesService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Save the video if it is not saved yet, otherwise remove it.
    ///
    /// One existence check, then exactly one write.
    pub async fn toggle(&self, user_id: &str, video: &VideoItem) -> Result<ToggleResult, AppError> {
        if video.id.trim().is_empty() {
            return Err(AppError::BadRequest("Missing video ID.".to_string()));
        }

        if self.db.get_favorite(user_id, &video.id).await?.is_some() {
            self.db.delete_favorite(user_id, &video.id).await?;
            tracing::info!(user_id, video_id = %video.id, "Favorite removed");
            return Ok(ToggleResult::Removed);
        }

        let favorite = FavoriteSermon {
            id: String::new(),
            title: video.title.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            video_id: video.id.clone(),
            saved_at: Utc::now(),
        };
        self.db.set_favorite(user_id, &favorite).await?;
        tracing::info!(user_id, video_id = %video.id, "Favorite saved");
        Ok(ToggleResult::Saved)
    }

    /// Saved sermons, most recent first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<FavoriteSermon>, AppError> {
        self.db.list_favorites(user_id).await
    }

    /// Video IDs the user has saved, for marking the sermon list.
    pub async fn video_ids(&self, user_id: &str) -> Result<BTreeSet<String>, AppError> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|f| f.video_id)
            .collect())
    }
}
