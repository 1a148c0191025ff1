// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Store shapes use the field names the mobile app already writes
//! (camelCase, `request`/`userId` for prayers), so documents created by
//! either side read the same way.

pub mod contact;
pub mod content;
pub mod prayer;
pub mod sermon;
pub mod theme;
pub mod user;
pub mod verse;

pub use contact::ContactMessage;
pub use content::{Announcement, CarouselImage, Event};
pub use prayer::PrayerRequest;
pub use sermon::{FavoriteSermon, FeaturedSermon, VideoItem};
pub use theme::{Palette, ThemeMode};
pub use user::{Credentials, PasswordReset, SessionRecord, UserProfile, UserSettings};
pub use verse::{Language, Verse, LANGUAGES};
