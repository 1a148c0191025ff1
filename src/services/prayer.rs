// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prayer requests: submission, the public wall and the personal journal.

use crate::db::{FirestoreDb, Query};
use crate::error::AppError;
use crate::models::PrayerRequest;
use crate::services::subscription::Subscription;
use crate::time_utils::{month_title, time_ago};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

pub const PRAYER_RECEIVED: &str = "Your prayer request has been received.";
const PRAYER_EMPTY: &str = "Please write your prayer request before submitting.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PrayerForm {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub request: String,
    #[serde(default)]
    pub is_public: bool,
}

/// A prayer with its relative age, as lists show it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerCard {
    #[serde(flatten)]
    pub prayer: PrayerRequest,
    pub time_ago: String,
}

impl PrayerCard {
    pub fn new(prayer: PrayerRequest, now: DateTime<Utc>) -> Self {
        let time_ago = time_ago(prayer.submitted_at, now);
        Self { prayer, time_ago }
    }
}

/// Journal prayers from one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSection {
    pub title: String,
    pub count: usize,
    pub prayers: Vec<PrayerCard>,
}

/// Group newest-first prayers into month sections, keeping order.
pub fn group_by_month(prayers: Vec<PrayerRequest>, now: DateTime<Utc>) -> Vec<MonthSection> {
    let mut sections: Vec<MonthSection> = Vec::new();
    for prayer in prayers {
        let title = month_title(prayer.submitted_at);
        let card = PrayerCard::new(prayer, now);
        match sections.last_mut() {
            Some(section) if section.title == title => {
                section.prayers.push(card);
                section.count += 1;
            }
            _ => sections.push(MonthSection {
                title,
                count: 1,
                prayers: vec![card],
            }),
        }
    }
    sections
}

#[derive(Clone)]
pub struct PrayerService {
    db: FirestoreDb,
    poll_interval: Duration,
}

impl PrayerService {
    pub fn new(db: FirestoreDb, poll_interval: Duration) -> Self {
        Self { db, poll_interval }
    }

    /// Store a new request for `user_id` and return it with its ID.
    pub async fn submit(
        &self,
        user_id: &str,
        form: &PrayerForm,
    ) -> Result<PrayerRequest, AppError> {
        crate::validation::validate_form(form, PRAYER_EMPTY)?;

        let mut prayer = PrayerRequest::new(
            form.request.trim().to_string(),
            user_id.to_string(),
            form.is_public,
            Utc::now(),
        );
        prayer.id = self.db.create_prayer(&prayer).await?;

        tracing::info!(
            user_id,
            prayer_id = %prayer.id,
            is_public = prayer.is_public,
            "Prayer submitted"
        );
        Ok(prayer)
    }

    /// Public prayers, newest first.
    pub async fn wall(&self) -> Result<Vec<PrayerRequest>, AppError> {
        self.db
            .query_prayers(&FirestoreDb::prayer_wall_query())
            .await
    }

    /// One user's prayers, newest first.
    pub async fn journal(&self, user_id: &str) -> Result<Vec<PrayerRequest>, AppError> {
        self.db
            .query_prayers(&FirestoreDb::prayer_journal_query(user_id))
            .await
    }

    pub fn watch_wall(&self) -> Subscription<PrayerRequest> {
        self.watch(FirestoreDb::prayer_wall_query())
    }

    pub fn watch_journal(&self, user_id: &str) -> Subscription<PrayerRequest> {
        self.watch(FirestoreDb::prayer_journal_query(user_id))
    }

    fn watch(&self, query: Query) -> Subscription<PrayerRequest> {
        Subscription::open(self.db.clone(), query, self.poll_interval)
    }

    /// Delete a request. Only its owner may.
    pub async fn delete(&self, user_id: &str, prayer_id: &str) -> Result<(), AppError> {
        let prayer = self
            .db
            .get_prayer(prayer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prayer {}", prayer_id)))?;

        if prayer.owner_id != user_id {
            tracing::warn!(user_id, prayer_id, "Refused to delete another user's prayer");
            return Err(AppError::Forbidden(
                "You can only delete your own prayer requests.".to_string(),
            ));
        }

        self.db.delete_prayer(prayer_id).await?;
        tracing::info!(user_id, prayer_id, "Prayer deleted");
        Ok(())
    }

    /// Add one "amen". Concurrent calls all count.
    pub async fn amen(&self, prayer_id: &str) -> Result<(), AppError> {
        self.db.increment_amen(prayer_id).await?;
        tracing::debug!(prayer_id, "Amen recorded");
        Ok(())
    }
}
