// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Video listing client for the church's uploads playlist, and the
//! append-only pager behind the sermons feed.

use crate::error::AppError;
use crate::models::VideoItem;
use crate::services::upstream::{http_client, request_failed};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::Mutex;

const YOUTUBE_API: &str = "Video service";

/// Videos requested per page.
pub const PAGE_SIZE: u32 = 25;

/// One page of the playlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub items: Vec<VideoItem>,
    /// Opaque continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Something that can list playlist pages.
pub trait VideoSource: Send + Sync {
    fn list_page(
        &self,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<VideoPage, AppError>> + Send;
}

/// YouTube Data API client (playlistItems).
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    playlist_id: String,
}

impl YouTubeClient {
    pub fn new(base_url: &str, api_key: String, playlist_id: String) -> Self {
        Self {
            http: http_client(),
            base_url: base_url.to_string(),
            api_key,
            playlist_id,
        }
    }

    /// Fetch one page of the uploads playlist.
    pub async fn list_playlist_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<VideoPage, AppError> {
        let url = format!("{}/playlistItems", self.base_url);
        let max_results = PAGE_SIZE.to_string();

        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", self.playlist_id.as_str()),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| request_failed(YOUTUBE_API, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| request_failed(YOUTUBE_API, e))?;

        parse_playlist_response(status, &text)
    }
}

impl VideoSource for YouTubeClient {
    fn list_page(
        &self,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<VideoPage, AppError>> + Send {
        self.list_playlist_page(page_token)
    }
}

/// Interpret a playlistItems body: `{ items, nextPageToken }` on success,
/// `{ error: { message } }` otherwise.
fn parse_playlist_response(status: reqwest::StatusCode, body: &str) -> Result<VideoPage, AppError> {
    let parsed: PlaylistResponse = serde_json::from_str(body).map_err(|e| {
        AppError::Upstream(format!(
            "{} sent an unexpected response (HTTP {}): {}",
            YOUTUBE_API, status, e
        ))
    })?;

    if let Some(error) = parsed.error {
        tracing::warn!(status = status.as_u16(), message = %error.message, "Video API error");
        return Err(AppError::Upstream(format!(
            "Failed to load videos: {}",
            error.message
        )));
    }

    let Some(items) = parsed.items else {
        return Err(AppError::Upstream(format!(
            "{} returned HTTP {} without items",
            YOUTUBE_API, status
        )));
    };

    Ok(VideoPage {
        items: items
            .into_iter()
            .filter_map(|item| {
                let snippet = item.snippet;
                let thumbnails = snippet.thumbnails.unwrap_or_default();
                let thumbnail = thumbnails
                    .high
                    .or(thumbnails.medium)
                    .or(thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                Some(VideoItem {
                    id: snippet.resource_id?.video_id,
                    title: snippet.title,
                    thumbnail_url: thumbnail,
                })
            })
            .collect(),
        next_page_token: parsed.next_page_token.filter(|t| !t.is_empty()),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistResponse {
    items: Option<Vec<PlaylistItem>>,
    next_page_token: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    resource_id: Option<ResourceId>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

// ─── Pager ───────────────────────────────────────────────────────

/// Result of asking the pager for more videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched; `added` new videos were appended.
    Loaded { added: usize },
    /// Another load is still in flight; nothing was requested.
    Busy,
    /// The last page was already loaded.
    Exhausted,
}

#[derive(Default)]
struct PagerState {
    items: Vec<VideoItem>,
    seen: HashSet<String>,
    next_page_token: Option<String>,
    started: bool,
}

/// Accumulates playlist pages for one viewer.
///
/// At most one load runs at a time. Videos already held are never added
/// twice, even if the playlist shifts between pages.
#[derive(Default)]
pub struct SermonPager {
    state: Mutex<PagerState>,
}

impl SermonPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the next page and append it.
    ///
    /// A failed fetch leaves the continuation token untouched, so calling
    /// again retries the same page.
    pub async fn load_next<S: VideoSource>(&self, source: &S) -> Result<LoadOutcome, AppError> {
        let Ok(mut state) = self.state.try_lock() else {
            return Ok(LoadOutcome::Busy);
        };

        if state.started && state.next_page_token.is_none() {
            return Ok(LoadOutcome::Exhausted);
        }

        let token = state.next_page_token.clone();
        let page = source.list_page(token.as_deref()).await?;

        let mut added = 0;
        for item in page.items {
            if state.seen.insert(item.id.clone()) {
                state.items.push(item);
                added += 1;
            }
        }
        state.next_page_token = page.next_page_token;
        state.started = true;

        tracing::debug!(added, total = state.items.len(), "Sermon page loaded");
        Ok(LoadOutcome::Loaded { added })
    }

    /// Drop everything and start again from the first page.
    pub async fn reset(&self) {
        *self.state.lock().await = PagerState::default();
    }

    /// Videos loaded so far, in playlist order.
    pub async fn items(&self) -> Vec<VideoItem> {
        self.state.lock().await.items.clone()
    }

    /// Whether another page can be requested.
    pub async fn has_more(&self) -> bool {
        let state = self.state.lock().await;
        !state.started || state.next_page_token.is_some()
    }
}
