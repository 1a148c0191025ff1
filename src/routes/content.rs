// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public content routes: home page, events, sermons, verses, strings and
//! the contact form.

use crate::error::{AppError, Result};
use crate::i18n;
use crate::middleware::auth::session_token;
use crate::models::{Event, Language, Verse, LANGUAGES};
use crate::routes::auth::MessageResponse;
use crate::services::content::HomeView;
use crate::services::contact::{self, ContactForm, MESSAGE_SENT};
use crate::services::youtube::VideoPage;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/home", get(get_home))
        .route("/api/events", get(get_events))
        .route("/api/sermons", get(get_sermons))
        .route("/api/verse", get(get_verse))
        .route("/api/verse/translate", get(translate_verse))
        .route("/api/verse/languages", get(get_languages))
        .route("/api/i18n/{locale}", get(get_strings))
        .route("/api/contact", post(send_contact_message))
}

async fn get_home(State(state): State<Arc<AppState>>) -> Json<HomeView> {
    Json(state.content_service.home().await)
}

async fn get_events(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.content_service.events().await?))
}

#[derive(Deserialize)]
struct SermonsParams {
    page_token: Option<String>,
}

/// One page of the sermon playlist. Pass `nextPageToken` back as
/// `page_token` for the following page.
async fn get_sermons(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SermonsParams>,
) -> Result<Json<VideoPage>> {
    let token = params.page_token.as_deref().filter(|t| !t.is_empty());
    Ok(Json(state.sermon_service.page(token).await?))
}

async fn get_verse(State(state): State<Arc<AppState>>) -> Result<Json<Verse>> {
    Ok(Json(state.verse_client.random_verse().await?))
}

#[derive(Deserialize)]
struct TranslateParams {
    #[serde(default)]
    text: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    lang: String,
}

async fn translate_verse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TranslateParams>,
) -> Result<Json<Verse>> {
    if params.text.trim().is_empty() {
        return Err(AppError::BadRequest("No verse to translate.".to_string()));
    }

    let verse = Verse {
        reference: params.reference,
        text: params.text,
    };
    Ok(Json(
        state
            .translation_client
            .translate(&verse, &params.lang)
            .await?,
    ))
}

async fn get_languages() -> Json<&'static [Language]> {
    Json(LANGUAGES)
}

#[derive(Serialize)]
struct StringsResponse {
    locale: String,
    strings: BTreeMap<&'static str, &'static str>,
}

/// String table for `locale`; unknown locales get English.
async fn get_strings(Path(locale): Path<String>) -> Json<StringsResponse> {
    let locale = if i18n::is_supported(&locale) {
        locale
    } else {
        i18n::DEFAULT_LOCALE.to_string()
    };
    let strings = i18n::strings(&locale);
    Json(StringsResponse { locale, strings })
}

/// Contact form. Signed-in senders are recorded with their user ID.
async fn send_contact_message(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<MessageResponse>> {
    let user_id = match session_token(&jar, &headers) {
        Some(token) => state
            .session_service
            .resolve(&token)
            .await
            .ok()
            .map(|session| session.user_id),
        None => None,
    };

    contact::submit(&state.db, &form, user_id.as_deref()).await?;
    Ok(MessageResponse::new(MESSAGE_SENT))
}
