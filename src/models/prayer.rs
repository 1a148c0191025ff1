// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Prayer request model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prayer request stored in Firestore (`prayerRequests/{id}`).
///
/// After creation the only mutation is the atomic `amenCount` increment;
/// the owner may delete it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequest {
    /// Document ID (filled on read; empty on a new request, so never stored)
    #[serde(
        rename(deserialize = "_firestore_id"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    /// Prayer text
    #[serde(rename = "request")]
    pub text: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub submitted_at: DateTime<Utc>,
    /// Owner's user ID
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub is_public: bool,
    #[serde(default)]
    pub amen_count: i64,
}

impl PrayerRequest {
    /// A new request as the submission path creates it.
    pub fn new(
        text: String,
        owner_id: String,
        is_public: bool,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            text,
            submitted_at,
            owner_id,
            is_public,
            amen_count: 0,
        }
    }
}
