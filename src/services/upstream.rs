// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared response handling for the public REST APIs.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Upper bound on a single upstream call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client used for every upstream API.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Check response status and parse the JSON body.
///
/// `api` names the upstream in error messages shown to the user.
pub async fn check_response_json<T: DeserializeOwned>(
    api: &str,
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!(api, "Upstream rate limit hit (429)");
            return Err(AppError::Upstream(format!(
                "{} is busy right now. Please try again later.",
                api
            )));
        }

        return Err(AppError::Upstream(format!(
            "{} returned HTTP {}: {}",
            api, status, body
        )));
    }

    response.json().await.map_err(|e| {
        AppError::Upstream(format!(
            "{} sent an unexpected response: {}",
            api,
            e.without_url()
        ))
    })
}

/// Map a transport failure (connect, timeout) to an upstream error.
///
/// The request URL is stripped: query strings carry API keys, and the
/// message is shown to callers.
pub fn request_failed(api: &str, err: reqwest::Error) -> AppError {
    let err = err.without_url();
    let reason = if err.is_timeout() {
        "the request timed out"
    } else if err.is_connect() {
        "the connection failed"
    } else {
        "the request failed"
    };
    tracing::debug!(api, error = %err, "Upstream transport error");
    AppError::Upstream(format!("Could not reach {}: {}", api, reason))
}
