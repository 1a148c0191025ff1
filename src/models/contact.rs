//! Contact form submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message sent through the contact form (`contactMessages`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub submitted_at: DateTime<Utc>,
    /// Sender's user ID when they were signed in
    #[serde(default)]
    pub user_id: Option<String>,
}
