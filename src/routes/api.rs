// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for signed-in users.

use crate::error::Result;
use crate::models::{FavoriteSermon, UserSettings, VideoItem};
use crate::routes::auth::MessageResponse;
use crate::services::favorites::ToggleResult;
use crate::services::profile::{ProfileUpdate, ProfileView, SettingsUpdate};
use crate::services::sermons::FeedView;
use crate::services::theme::ThemeState;
use crate::services::Session;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/theme", get(get_theme))
        .route("/api/theme/toggle", post(toggle_theme))
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/password-reset", post(send_password_reset))
        .route("/api/favorites", get(get_favorites))
        .route("/api/favorites/ids", get(get_favorite_ids))
        .route("/api/favorites/toggle", post(toggle_favorite))
        .route("/api/sermons/feed", get(get_sermon_feed))
}

// ─── Session & Theme ─────────────────────────────────────────

async fn get_session(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

async fn get_theme(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<ThemeState> {
    Json(state.theme_service.current(&session.user_id).await)
}

/// Flip light/dark. The new mode is returned even if saving it failed;
/// `persisted` tells the client which happened.
async fn toggle_theme(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<ThemeState> {
    Json(state.theme_service.toggle(&session.user_id).await)
}

// ─── Profile & Settings ──────────────────────────────────────

async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserSettings>> {
    Ok(Json(state.profile_service.settings(&session.user_id).await?))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<UserSettings>> {
    let settings = state
        .profile_service
        .update_settings(&session.user_id, &update)
        .await?;
    if update.dark_mode.is_some() {
        state.theme_service.forget(&session.user_id);
    }
    Ok(Json(settings))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profile_service.profile(&session.user_id).await?))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    state
        .profile_service
        .update(&session.user_id, &update)
        .await?;
    Ok(Json(state.profile_service.profile(&session.user_id).await?))
}

/// Password reset for the signed-in user's own address.
async fn send_password_reset(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<MessageResponse>> {
    let message = state
        .session_service
        .request_password_reset(&session.email)
        .await?;
    Ok(MessageResponse::new(message))
}

// ─── Favorites & Sermon Feed ─────────────────────────────────

async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<FavoriteSermon>>> {
    Ok(Json(state.favorites_service.list(&session.user_id).await?))
}

async fn get_favorite_ids(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<BTreeSet<String>>> {
    Ok(Json(
        state
            .favorites_service
            .video_ids(&session.user_id)
            .await?,
    ))
}

#[derive(Serialize)]
struct ToggleResponse {
    result: ToggleResult,
    message: &'static str,
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(video): Json<VideoItem>,
) -> Result<Json<ToggleResponse>> {
    let result = state
        .favorites_service
        .toggle(&session.user_id, &video)
        .await?;
    Ok(Json(ToggleResponse {
        result,
        message: result.message(),
    }))
}

#[derive(Deserialize)]
struct FeedParams {
    #[serde(default)]
    refresh: bool,
}

/// Append the next playlist page to the caller's feed.
async fn get_sermon_feed(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedView>> {
    Ok(Json(
        state
            .sermon_service
            .load_more(&session.user_id, params.refresh)
            .await?,
    ))
}
