// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sermon listing: a stateless page proxy plus a per-user feed.

use crate::error::AppError;
use crate::models::VideoItem;
use crate::services::cache::IdleMap;
use crate::services::youtube::{LoadOutcome, SermonPager, VideoPage, YouTubeClient};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// The accumulated feed after a load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub items: Vec<VideoItem>,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct SermonService {
    client: YouTubeClient,
    pagers: IdleMap<Arc<SermonPager>>,
}

impl SermonService {
    /// Feeds left unused for `max_idle` are dropped.
    pub fn new(client: YouTubeClient, max_idle: Duration) -> Self {
        Self {
            client,
            pagers: IdleMap::new(max_idle),
        }
    }

    /// One playlist page, passed straight through.
    pub async fn page(&self, page_token: Option<&str>) -> Result<VideoPage, AppError> {
        self.client.list_playlist_page(page_token).await
    }

    fn pager(&self, user_id: &str) -> Arc<SermonPager> {
        self.pagers
            .update(user_id, || Arc::new(SermonPager::new()), |pager| pager.clone())
    }

    /// Load the next page of a user's feed.
    ///
    /// `refresh` starts over from the first page.
    pub async fn load_more(&self, user_id: &str, refresh: bool) -> Result<FeedView, AppError> {
        let pager = self.pager(user_id);
        if refresh {
            pager.reset().await;
        }

        if pager.load_next(&self.client).await? == LoadOutcome::Busy {
            return Err(AppError::Conflict(
                "More sermons are already loading.".to_string(),
            ));
        }

        Ok(FeedView {
            items: pager.items().await,
            has_more: pager.has_more().await,
        })
    }

    /// Drop a user's feed (on sign-out).
    pub fn forget(&self, user_id: &str) {
        self.pagers.remove(user_id);
    }

    /// Drop feeds of users not seen recently.
    pub fn evict_idle(&self) -> usize {
        self.pagers.evict_idle()
    }
}
