// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in, sign-out and password reset routes.

use crate::error::Result;
use crate::middleware::auth::{session_token, SESSION_COOKIE};
use crate::services::session::{OpenedSession, ResetConfirmForm, Session, SignInForm, SignUpForm};
use crate::AppState;
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Auth routes (public).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(sign_in))
        .route("/auth/logout", post(sign_out))
        .route("/auth/password-reset", post(request_password_reset))
        .route("/auth/password-reset/confirm", post(confirm_password_reset))
}

/// Returned after sign-up or sign-in. The token is also set as a cookie;
/// native clients send it back as a bearer token.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Session,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn with_session_cookie(
    state: &AppState,
    jar: CookieJar,
    opened: OpenedSession,
) -> (CookieJar, Json<AuthResponse>) {
    let secure = !state.config.frontend_url.starts_with("http://");
    let cookie = Cookie::build((SESSION_COOKIE, opened.token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);

    (
        jar.add(cookie),
        Json(AuthResponse {
            token: opened.token,
            user: opened.session,
        }),
    )
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignUpForm>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let opened = state.session_service.sign_up(&form).await?;
    Ok(with_session_cookie(&state, jar, opened))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignInForm>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let opened = state.session_service.sign_in(&form).await?;
    Ok(with_session_cookie(&state, jar, opened))
}

/// End the caller's session and clear the cookie.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(token) = session_token(&jar, &headers) {
        if let Ok(session) = state.session_service.resolve(&token).await {
            state.theme_service.forget(&session.user_id);
            state.sermon_service.forget(&session.user_id);
        }
        state.session_service.sign_out_token(&token).await?;
    }

    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        MessageResponse::new("Signed out."),
    ))
}

#[derive(Deserialize)]
struct ResetRequest {
    #[serde(default)]
    email: String,
}

async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<MessageResponse>> {
    let message = state
        .session_service
        .request_password_reset(&body.email)
        .await?;
    Ok(MessageResponse::new(message))
}

async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ResetConfirmForm>,
) -> Result<Json<MessageResponse>> {
    state.session_service.confirm_password_reset(&form).await?;
    Ok(MessageResponse::new(
        "Your password has been changed. Please sign in.",
    ))
}
