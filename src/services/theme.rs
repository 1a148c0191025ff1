// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user light/dark preference.
//!
//! The mode is read from `settings.darkMode` once per user and then served
//! from memory. A toggle flips the in-memory mode before the write is
//! issued, and a failed write does not undo it.

use crate::db::FirestoreDb;
use crate::models::{Palette, ThemeMode};
use crate::services::cache::IdleMap;
use serde::Serialize;
use std::time::Duration;

/// Current theme as returned to the client.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub palette: Palette,
    /// False when the last toggle could not be saved
    pub persisted: bool,
}

impl ThemeState {
    fn new(mode: ThemeMode, persisted: bool) -> Self {
        Self {
            mode,
            palette: mode.palette(),
            persisted,
        }
    }
}

#[derive(Clone)]
pub struct ThemeService {
    db: FirestoreDb,
    modes: IdleMap<ThemeMode>,
}

impl ThemeService {
    /// Cached modes unused this long are dropped and re-read on next use.
    pub fn new(db: FirestoreDb, max_idle: Duration) -> Self {
        Self {
            db,
            modes: IdleMap::new(max_idle),
        }
    }

    /// Current mode for a user, reading the store on first use.
    ///
    /// A missing, malformed or unreadable preference means dark mode.
    pub async fn current(&self, user_id: &str) -> ThemeState {
        if let Some(mode) = self.modes.get(user_id) {
            return ThemeState::new(mode, true);
        }

        let mode = match self.db.get_user_settings_raw(user_id).await {
            Ok(settings) => settings
                .as_ref()
                .and_then(|s| s.get("darkMode"))
                .and_then(|v| v.as_bool())
                .map(ThemeMode::from_dark_flag)
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Theme preference unreadable, using dark mode"
                );
                ThemeMode::default()
            }
        };

        // A concurrent toggle may have landed while reading; it wins.
        let mode = self.modes.get_or_insert(user_id, mode);
        ThemeState::new(mode, true)
    }

    /// Flip the mode and persist it.
    pub async fn toggle(&self, user_id: &str) -> ThemeState {
        self.current(user_id).await;

        let mode = self.modes.update(user_id, ThemeMode::default, |mode| {
            *mode = mode.toggled();
            *mode
        });

        let persisted = match self.db.set_dark_mode(user_id, mode.is_dark()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to save theme preference");
                false
            }
        };

        ThemeState::new(mode, persisted)
    }

    /// Forget the cached mode so the next read goes to the store.
    pub fn forget(&self, user_id: &str) {
        self.modes.remove(user_id);
    }

    /// Drop modes of users not seen recently.
    pub fn evict_idle(&self) -> usize {
        self.modes.evict_idle()
    }
}
