// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.
//!
//! Every write path checks its form before touching the store: a rejected
//! form must leave the write counter where it was.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_json, request, sign_up};

fn writes(state: &congregation::AppState) -> u64 {
    state.db.memory_store().unwrap().write_count()
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request(Method::POST, uri, token, Some(body)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_sign_up_password_mismatch_writes_nothing() {
    let (app, state) = common::create_test_app();
    let mut form = common::sign_up_form("grace@example.com");
    form["confirmPassword"] = json!("something else");

    let (status, body) = post_json(&app, "/auth/signup", None, form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "The passwords you entered do not match.");
    assert_eq!(writes(&state), 0);
    assert_eq!(state.db.memory_store().unwrap().read_count(), 0);
}

#[tokio::test]
async fn test_sign_up_missing_field() {
    let (app, state) = common::create_test_app();
    let mut form = common::sign_up_form("grace@example.com");
    form.as_object_mut().unwrap().remove("mobileNumber");

    let (status, body) = post_json(&app, "/auth/signup", None, form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Please fill out all fields.");
    assert_eq!(writes(&state), 0);
}

#[tokio::test]
async fn test_sign_up_invalid_email() {
    let (app, state) = common::create_test_app();

    let (status, _) = post_json(
        &app,
        "/auth/signup",
        None,
        common::sign_up_form("not-an-address"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(writes(&state), 0);
}

#[tokio::test]
async fn test_sign_in_requires_both_fields() {
    let (app, _) = common::create_test_app();

    let (status, body) = post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "grace@example.com", "password": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Please enter both email and password.");
}

#[tokio::test]
async fn test_blank_prayer_rejected() {
    let (app, state) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;
    let before = writes(&state);

    let (status, body) = post_json(
        &app,
        "/api/prayers",
        Some(&token),
        json!({ "request": "   ", "isPublic": true }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        "Please write your prayer request before submitting."
    );
    assert_eq!(writes(&state), before);
}

#[tokio::test]
async fn test_contact_form_validation() {
    let (app, state) = common::create_test_app();

    let (status, body) = post_json(
        &app,
        "/api/contact",
        None,
        json!({ "name": "Grace", "email": "grace@example.com", "message": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Please fill out all fields before sending.");

    let (status, body) = post_json(
        &app,
        "/api/contact",
        None,
        json!({ "name": "Grace", "email": "grace at example", "message": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Please enter a valid email address.");
    assert_eq!(writes(&state), 0);

    let (status, body) = post_json(
        &app,
        "/api/contact",
        None,
        json!({ "name": "Grace", "email": "grace@example.com", "message": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Thank you for contacting us. We will get back to you shortly."
    );
    assert_eq!(writes(&state), 1);
}

#[tokio::test]
async fn test_profile_update_needs_a_field() {
    let (app, state) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;
    let before = writes(&state);

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            "/api/profile",
            Some(&token),
            Some(json!({ "displayName": " " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["details"],
        "Enter a display name or choose a photo."
    );
    assert_eq!(writes(&state), before);
}

#[tokio::test]
async fn test_unsupported_language_rejected() {
    let (app, state) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;
    let before = writes(&state);

    let response = app
        .oneshot(request(
            Method::PUT,
            "/api/settings",
            Some(&token),
            Some(json!({ "language": "xx" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(writes(&state), before);
}

#[tokio::test]
async fn test_favorite_toggle_requires_video_id() {
    let (app, state) = common::create_test_app();
    let token = sign_up(&app, "grace@example.com").await;
    let before = writes(&state);

    let (status, _) = post_json(
        &app,
        "/api/favorites/toggle",
        Some(&token),
        json!({ "id": "", "title": "Sunday", "thumbnailUrl": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(writes(&state), before);
}
