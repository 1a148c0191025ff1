// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a live session
//! 2. Sign-up, sign-in and sign-out open and close sessions
//! 3. Password reset codes work once
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use congregation::config::Config;
use congregation::db::FirestoreDb;
use congregation::middleware::auth::create_jwt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

mod common;
use common::{body_json, request, sign_up};

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(request(Method::GET, "/api/session", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/prayers/wall",
            Some("invalid.token.here"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_well_signed_token_without_session_rejected() {
    let (app, state) = common::create_test_app();
    // Correct signature, but no session document behind it
    let token = create_jwt("someone", "no-such-session", &state.config.jwt_signing_key).unwrap();

    let response = app
        .oneshot(request(Method::GET, "/api/session", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_up_opens_session() {
    let (app, _) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;

    let response = app
        .oneshot(request(Method::GET, "/api/session", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = body_json(response).await;
    assert_eq!(session["email"], "grace@example.com");
    assert_eq!(session["displayName"], "Grace Hopper");
    assert!(session["userId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(session.get("sessionId").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (app, _) = common::create_test_app();
    sign_up(&app, "grace@example.com").await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/signup",
            None,
            Some(common::sign_up_form("Grace@Example.com ")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sign_in_and_wrong_password() {
    let (app, _) = common::create_test_app();
    sign_up(&app, "grace@example.com").await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "grace@example.com", "password": "wrong" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["details"],
        "Invalid email or password."
    );

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "GRACE@example.com", "password": "correct horse" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "grace@example.com");
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let (app, _) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/auth/logout", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The JWT is still well-signed, but its session is gone
    let response = app
        .oneshot(request(Method::GET, "/api/session", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (app, state) = common::create_test_app();
    sign_up(&app, "grace@example.com").await;

    // Unknown and known addresses get the same answer
    for email in ["nobody@example.com", "grace@example.com"] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/auth/password-reset",
                None,
                Some(json!({ "email": email })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "A password reset link has been sent to your email address."
        );
    }
    assert!(state.outbox.last_to("nobody@example.com").is_none());

    let mail = state.outbox.last_to("grace@example.com").expect("reset mail");
    let code = mail.body.rsplit(' ').next().unwrap().to_string();

    let confirm = json!({
        "token": code,
        "password": "new password",
        "confirmPassword": "new password",
    });
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            Some(confirm.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Single use
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            Some(confirm),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "grace@example.com", "password": "new password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Mail relay that records what it is asked to deliver.
async fn recording_relay(status: StatusCode) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let router = Router::new().route(
        "/send",
        post(move |headers: HeaderMap, Json(message): Json<Value>| {
            let sink = sink.clone();
            async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                sink.lock().unwrap().push((auth, message));
                status
            }
        }),
    );
    (format!("{}/send", common::spawn_upstream(router).await), received)
}

fn relay_config(url: String) -> Config {
    Config {
        mail_relay_url: Some(url),
        mail_relay_key: "relay-key".to_string(),
        mail_from: "office@church.example".to_string(),
        ..Config::test_default()
    }
}

#[tokio::test]
async fn test_password_reset_delivered_through_relay() {
    let (url, received) = recording_relay(StatusCode::ACCEPTED).await;
    let (app, _) = common::create_test_app_with(relay_config(url), FirestoreDb::new_in_memory());
    let token = sign_up(&app, "grace@example.com").await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/profile/password-reset",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let (auth, message) = &received[0];
    assert_eq!(auth, "Bearer relay-key");
    assert_eq!(message["to"], "grace@example.com");
    assert_eq!(message["from"], "office@church.example");

    // The delivered code works
    let code = message["text"].as_str().unwrap().rsplit(' ').next().unwrap();
    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            Some(json!({
                "token": code,
                "password": "new password",
                "confirmPassword": "new password",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_relay_failure_reported() {
    let (url, _) = recording_relay(StatusCode::SERVICE_UNAVAILABLE).await;
    let (app, state) =
        common::create_test_app_with(relay_config(url), FirestoreDb::new_in_memory());
    sign_up(&app, "grace@example.com").await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/password-reset",
            None,
            Some(json!({ "email": "grace@example.com" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(state.outbox.last_to("grace@example.com").is_none());
}

#[tokio::test]
async fn test_password_reset_requires_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/password-reset",
            None,
            Some(json!({ "email": "  " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["details"],
        "Please enter your email address to reset your password."
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/prayers/wall")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
