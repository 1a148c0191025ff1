// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verse-of-the-day and translation API clients.

use crate::error::AppError;
use crate::models::verse::{language, Language};
use crate::models::Verse;
use crate::services::upstream::{check_response_json, http_client, request_failed};
use serde::Deserialize;

const VERSE_API: &str = "Verse service";
const TRANSLATION_API: &str = "Translation service";

/// Client for the verse-of-the-day API.
#[derive(Clone)]
pub struct VerseClient {
    http: reqwest::Client,
    base_url: String,
}

impl VerseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: http_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch a random verse.
    pub async fn random_verse(&self) -> Result<Verse, AppError> {
        let url = format!("{}/get", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("order", "random")])
            .send()
            .await
            .map_err(|e| request_failed(VERSE_API, e))?;

        let body: VerseResponse = check_response_json(VERSE_API, response).await?;
        let details = body.verse.details;

        Ok(Verse {
            reference: details.reference.trim().to_string(),
            text: details.text.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VerseResponse {
    verse: VerseBody,
}

#[derive(Debug, Deserialize)]
struct VerseBody {
    details: VerseDetails,
}

#[derive(Debug, Deserialize)]
struct VerseDetails {
    reference: String,
    text: String,
}

/// Client for the machine translation API.
#[derive(Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranslationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: http_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Translate an English verse into `target`.
    ///
    /// English returns the verse untouched without calling the API.
    pub async fn translate(&self, verse: &Verse, target: &str) -> Result<Verse, AppError> {
        let lang: &Language = language(target)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported language: {}", target)))?;

        if lang.code == "en" {
            return Ok(verse.clone());
        }

        let url = format!("{}/get", self.base_url);
        let langpair = format!("en|{}", lang.code);

        let response = self
            .http
            .get(&url)
            .query(&[("q", verse.text.as_str()), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| request_failed(TRANSLATION_API, e))?;

        let body: TranslationResponse = check_response_json(TRANSLATION_API, response).await?;
        let translated = body.response_data.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(AppError::Upstream(format!(
                "{} returned an empty translation",
                TRANSLATION_API
            )));
        }

        tracing::debug!(lang = lang.code, reference = %verse.reference, "Verse translated");

        Ok(Verse {
            reference: verse.reference.clone(),
            text: translated,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationResponse {
    response_data: TranslationData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationData {
    translated_text: String,
}
