// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie attribute tests.
//!
//! These tests verify the session cookie set on sign-up, that it alone
//! authenticates requests, and that logout removes it.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use congregation::config::Config;
use congregation::db::FirestoreDb;
use tower::ServiceExt;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

fn app_with_frontend_url(frontend_url: &str) -> axum::Router {
    let config = Config {
        frontend_url: frontend_url.to_string(),
        ..Config::test_default()
    };
    common::create_test_app_with(config, FirestoreDb::new_in_memory()).0
}

async fn sign_up_response(app: &axum::Router) -> Response {
    app.clone()
        .oneshot(common::request(
            Method::POST,
            "/auth/signup",
            None,
            Some(common::sign_up_form("grace@example.com")),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_session_cookie_localhost_attributes() {
    let app = app_with_frontend_url("http://localhost:5173");
    let response = sign_up_response(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = find_cookie(&set_cookie_headers(&response), "congregation_token");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    assert!(!cookie.contains("Secure"), "{cookie}");
}

#[tokio::test]
async fn test_session_cookie_secure_in_production() {
    let app = app_with_frontend_url("https://app.example.org");
    let response = sign_up_response(&app).await;

    let cookie = find_cookie(&set_cookie_headers(&response), "congregation_token");
    assert!(cookie.contains("Secure"), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
}

#[tokio::test]
async fn test_cookie_authenticates_and_logout_removes_it() {
    let app = app_with_frontend_url("http://localhost:5173");
    let response = sign_up_response(&app).await;
    let cookie = find_cookie(&set_cookie_headers(&response), "congregation_token");
    let pair = cookie.split(';').next().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .header(header::COOKIE, &pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, &pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removal = find_cookie(&set_cookie_headers(&response), "congregation_token");
    assert!(removal.contains("Path=/"), "{removal}");
    assert!(removal.contains("Max-Age=0"), "{removal}");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .header(header::COOKIE, &pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
