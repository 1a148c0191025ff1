// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cache;
pub mod contact;
pub mod content;
pub mod favorites;
pub mod mail;
pub mod prayer;
pub mod profile;
pub mod sermons;
pub mod session;
pub mod subscription;
pub mod theme;
pub mod upstream;
pub mod verse;
pub mod youtube;

pub use cache::QueryCache;
pub use content::ContentService;
pub use favorites::FavoritesService;
pub use mail::MailOutbox;
pub use prayer::PrayerService;
pub use profile::ProfileService;
pub use sermons::SermonService;
pub use session::{Session, SessionService};
pub use subscription::{AbortOnDrop, Subscription};
pub use theme::ThemeService;
pub use verse::{TranslationClient, VerseClient};
pub use youtube::{SermonPager, YouTubeClient};
