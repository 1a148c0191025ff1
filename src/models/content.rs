// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Read-only reference content written by the church's admin tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Home page carousel slide (`carouselImages`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselImage {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub order: i64,
}

/// Announcement (`Announcements`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
}

/// Church event (`events`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub title: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}
