// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prayer routes: submission, amen, deletion, and the wall and journal as
//! one-shot reads or live event streams.

use crate::error::Result;
use crate::models::PrayerRequest;
use crate::routes::auth::MessageResponse;
use crate::services::prayer::{
    group_by_month, MonthSection, PrayerCard, PrayerForm, PRAYER_RECEIVED,
};
use crate::services::{Session, Subscription};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use futures_util::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/prayers", post(submit_prayer))
        .route("/api/prayers/mine", get(get_journal))
        .route("/api/prayers/mine/stream", get(stream_journal))
        .route("/api/prayers/wall", get(get_wall))
        .route("/api/prayers/wall/stream", get(stream_wall))
        .route("/api/prayers/{id}", delete(delete_prayer))
        .route("/api/prayers/{id}/amen", post(amen))
}

#[derive(Serialize)]
struct SubmittedResponse {
    message: &'static str,
    prayer: PrayerRequest,
}

async fn submit_prayer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(form): Json<PrayerForm>,
) -> Result<Json<SubmittedResponse>> {
    let prayer = state
        .prayer_service
        .submit(&session.user_id, &form)
        .await?;
    Ok(Json(SubmittedResponse {
        message: PRAYER_RECEIVED,
        prayer,
    }))
}

fn wall_cards(prayers: Vec<PrayerRequest>) -> Vec<PrayerCard> {
    let now = Utc::now();
    prayers
        .into_iter()
        .map(|prayer| PrayerCard::new(prayer, now))
        .collect()
}

fn journal_sections(prayers: Vec<PrayerRequest>) -> Vec<MonthSection> {
    group_by_month(prayers, Utc::now())
}

async fn get_wall(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PrayerCard>>> {
    let prayers = state.prayer_service.wall().await?;
    Ok(Json(wall_cards(prayers)))
}

async fn get_journal(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<MonthSection>>> {
    let prayers = state.prayer_service.journal(&session.user_id).await?;
    Ok(Json(journal_sections(prayers)))
}

async fn stream_wall(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.prayer_service.watch_wall();
    Sse::new(snapshot_events(subscription, wall_cards)).keep_alive(KeepAlive::default())
}

async fn stream_journal(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.prayer_service.watch_journal(&session.user_id);
    Sse::new(snapshot_events(subscription, journal_sections)).keep_alive(KeepAlive::default())
}

/// Turn a subscription into `snapshot` events (or `error` events when a
/// read fails). The subscription, and with it the watcher task, lives
/// exactly as long as the client stays connected.
fn snapshot_events<V, F>(
    subscription: Subscription<PrayerRequest>,
    view: F,
) -> impl Stream<Item = std::result::Result<Event, Infallible>>
where
    V: Serialize,
    F: Fn(Vec<PrayerRequest>) -> V + Send + 'static,
{
    futures_util::stream::unfold(
        (subscription, view),
        |(mut subscription, view)| async move {
            let event = match subscription.next().await? {
                Ok(prayers) => Event::default()
                    .event("snapshot")
                    .json_data(view(prayers))
                    .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
                Err(e) => Event::default().event("error").data(e.to_string()),
            };
            Some((Ok(event), (subscription, view)))
        },
    )
}

async fn delete_prayer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.prayer_service.delete(&session.user_id, &id).await?;
    Ok(MessageResponse::new("Prayer request deleted."))
}

async fn amen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.prayer_service.amen(&id).await?;
    Ok(MessageResponse::new("Amen."))
}
