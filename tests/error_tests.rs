// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use congregation::error::AppError;

async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_is_validation() {
    assert!(AppError::BadRequest(AppError::PASSWORD_MISMATCH.to_string()).is_validation());
    assert!(!AppError::Conflict("taken".to_string()).is_validation());
    assert!(!AppError::Upstream("down".to_string()).is_validation());
}

#[tokio::test]
async fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("no".to_string()), StatusCode::FORBIDDEN),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
        (AppError::Upstream("x".to_string()), StatusCode::BAD_GATEWAY),
        (AppError::Database("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        let (status, _) = body(err).await;
        assert_eq!(status, expected);
    }
}

#[tokio::test]
async fn test_internal_details_hidden() {
    let (_, json) = body(AppError::Database("connection string with secrets".to_string())).await;
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());

    let (_, json) = body(AppError::Internal(anyhow::anyhow!("stack trace"))).await;
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_validation_message_shown() {
    let (_, json) = body(AppError::BadRequest(AppError::PASSWORD_MISMATCH.to_string())).await;
    assert_eq!(json["error"], "bad_request");
    assert_eq!(json["details"], "The passwords you entered do not match.");
}
