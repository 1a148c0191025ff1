// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outgoing account mail.
//!
//! Messages are delivered through an HTTP mail relay (`MAIL_RELAY_URL`),
//! which takes `{ from, to, subject, text }` as JSON with a bearer key.
//! Without a relay, mail is only logged. Either way the last messages are
//! kept in a bounded in-memory outbox for inspection.

use crate::config::Config;
use crate::error::AppError;
use crate::services::upstream::{http_client, request_failed};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const OUTBOX_CAPACITY: usize = 100;
const MAIL_RELAY: &str = "Mail relay";

/// A message handed to the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Clone)]
struct MailRelay {
    http: reqwest::Client,
    url: String,
    api_key: String,
    from: String,
}

impl MailRelay {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&RelayMessage {
                from: &self.from,
                to: &mail.to,
                subject: &mail.subject,
                text: &mail.body,
            })
            .send()
            .await
            .map_err(|e| request_failed(MAIL_RELAY, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "{} returned HTTP {}",
                MAIL_RELAY, status
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MailOutbox {
    relay: Option<MailRelay>,
    sent: Arc<Mutex<VecDeque<OutgoingMail>>>,
}

impl MailOutbox {
    /// Log-only outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox that delivers through the relay at `url`.
    pub fn with_relay(url: &str, api_key: String, from: String) -> Self {
        Self {
            relay: Some(MailRelay {
                http: http_client(),
                url: url.to_string(),
                api_key,
                from,
            }),
            sent: Arc::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.mail_relay_url {
            Some(url) => Self::with_relay(
                url,
                config.mail_relay_key.clone(),
                config.mail_from.clone(),
            ),
            None => {
                tracing::warn!("MAIL_RELAY_URL not set; account mail is logged, not delivered");
                Self::new()
            }
        }
    }

    /// Deliver `mail`. On success it is also kept in the outbox.
    pub async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        match &self.relay {
            Some(relay) => {
                relay.deliver(&mail).await.inspect_err(|e| {
                    tracing::error!(to = %mail.to, error = %e, "Mail delivery failed");
                })?;
                tracing::info!(to = %mail.to, subject = %mail.subject, "Mail delivered");
            }
            None => tracing::info!(to = %mail.to, subject = %mail.subject, "Mail logged"),
        }

        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        if sent.len() == OUTBOX_CAPACITY {
            sent.pop_front();
        }
        sent.push_back(mail);
        Ok(())
    }

    /// Most recent message sent to `to`, if any.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter().rev().find(|m| m.to == to).cloned()
    }
}
