// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Congregation: backend for a church-community app
//!
//! This crate serves the app's sermons, prayer requests, events, daily
//! verses and user profiles over JSON/HTTP, backed by Firestore and a few
//! public REST APIs. Live prayer views are pushed as server-sent events.

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::FirestoreDb;
use std::time::Duration;
use services::{
    AbortOnDrop, ContentService, FavoritesService, MailOutbox, PrayerService, ProfileService,
    QueryCache, SermonService, SessionService, ThemeService, TranslationClient, VerseClient,
    YouTubeClient,
};

/// Per-user theme and feed state unused this long is dropped.
const USER_STATE_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub cache: QueryCache,
    pub outbox: MailOutbox,
    pub session_service: SessionService,
    pub theme_service: ThemeService,
    pub content_service: ContentService,
    pub sermon_service: SermonService,
    pub verse_client: VerseClient,
    pub translation_client: TranslationClient,
    pub prayer_service: PrayerService,
    pub favorites_service: FavoritesService,
    pub profile_service: ProfileService,
    _cache_invalidator: AbortOnDrop<()>,
    _idle_sweeper: AbortOnDrop<()>,
}

impl AppState {
    /// Build every service over `db`.
    ///
    /// Must be called inside a tokio runtime: the cache invalidator and the
    /// idle-state sweeper are spawned here and stop when the state is
    /// dropped.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let cache = QueryCache::new(config.cache_ttl);
        let cache_invalidator = AbortOnDrop::new(cache.spawn_invalidator(&db));
        let outbox = MailOutbox::from_config(&config);
        let verse_client = VerseClient::new(&config.verse_api_url);
        let youtube = YouTubeClient::new(
            &config.youtube_api_url,
            config.youtube_api_key.clone(),
            config.youtube_playlist_id.clone(),
        );

        let theme_service = ThemeService::new(db.clone(), USER_STATE_MAX_IDLE);
        let sermon_service = SermonService::new(youtube, USER_STATE_MAX_IDLE);
        let idle_sweeper = AbortOnDrop::new(spawn_idle_sweeper(
            theme_service.clone(),
            sermon_service.clone(),
        ));

        Self {
            session_service: SessionService::new(
                db.clone(),
                &config.jwt_signing_key,
                outbox.clone(),
            ),
            theme_service,
            content_service: ContentService::new(db.clone(), cache.clone(), verse_client.clone()),
            sermon_service,
            verse_client,
            translation_client: TranslationClient::new(&config.translation_api_url),
            prayer_service: PrayerService::new(db.clone(), config.snapshot_poll_interval),
            favorites_service: FavoritesService::new(db.clone()),
            profile_service: ProfileService::new(db.clone()),
            _cache_invalidator: cache_invalidator,
            _idle_sweeper: idle_sweeper,
            cache,
            outbox,
            db,
            config,
        }
    }
}

/// Periodically drop per-user state of users who went away without
/// signing out.
fn spawn_idle_sweeper(theme: ThemeService, sermons: SermonService) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(IDLE_SWEEP_INTERVAL);
        // The first tick completes immediately
        sweep.tick().await;
        loop {
            sweep.tick().await;
            let themes = theme.evict_idle();
            let feeds = sermons.evict_idle();
            if themes + feeds > 0 {
                tracing::debug!(themes, feeds, "Evicted idle user state");
            }
        }
    })
}
