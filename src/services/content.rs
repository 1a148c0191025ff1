// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home page and events views over the reference collections.

use crate::db::{collections, CollectionRef, Direction, FirestoreDb, Query};
use crate::error::AppError;
use crate::models::{Announcement, CarouselImage, Event, FeaturedSermon, Verse};
use crate::services::cache::QueryCache;
use crate::services::verse::VerseClient;
use serde::Serialize;

const HOME_ANNOUNCEMENTS: u32 = 5;
const HOME_EVENTS: u32 = 3;

/// Announcement with the home page's "new" badge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementCard {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub is_new: bool,
}

/// Everything the home page shows.
///
/// Each section settles on its own; a failed section is empty (the verse
/// is absent) and named in `failed_sections`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub carousel: Vec<CarouselImage>,
    pub announcements: Vec<AnnouncementCard>,
    pub upcoming_events: Vec<Event>,
    pub featured_sermons: Vec<FeaturedSermon>,
    pub verse: Option<Verse>,
    pub failed_sections: Vec<&'static str>,
}

#[derive(Clone)]
pub struct ContentService {
    db: FirestoreDb,
    cache: QueryCache,
    verses: VerseClient,
}

impl ContentService {
    pub fn new(db: FirestoreDb, cache: QueryCache, verses: VerseClient) -> Self {
        Self { db, cache, verses }
    }

    pub fn carousel_query() -> Query {
        Query::new(CollectionRef::root(collections::CAROUSEL_IMAGES))
            .order_by("order", Direction::Ascending)
    }

    pub fn announcements_query() -> Query {
        Query::new(CollectionRef::root(collections::ANNOUNCEMENTS))
            .order_by("date", Direction::Descending)
            .limit(HOME_ANNOUNCEMENTS)
    }

    pub fn upcoming_events_query() -> Query {
        Self::events_query().limit(HOME_EVENTS)
    }

    pub fn events_query() -> Query {
        Query::new(CollectionRef::root(collections::EVENTS)).order_by("date", Direction::Ascending)
    }

    pub fn featured_sermons_query() -> Query {
        Query::new(CollectionRef::root(collections::FEATURED_SERMONS))
            .order_by("order", Direction::Ascending)
    }

    /// Compose the home page. Never fails as a whole.
    pub async fn home(&self) -> HomeView {
        let carousel_query = Self::carousel_query();
        let announcements_query = Self::announcements_query();
        let events_query = Self::upcoming_events_query();
        let sermons_query = Self::featured_sermons_query();

        let (carousel, announcements, events, sermons, verse) = tokio::join!(
            self.cache.get_or_fetch::<CarouselImage>(&self.db, &carousel_query),
            self.cache.get_or_fetch::<Announcement>(&self.db, &announcements_query),
            self.cache.get_or_fetch::<Event>(&self.db, &events_query),
            self.cache.get_or_fetch::<FeaturedSermon>(&self.db, &sermons_query),
            self.verses.random_verse(),
        );

        let mut failed_sections = Vec::new();
        let carousel = settle("carousel", carousel, &mut failed_sections);
        let announcements = settle("announcements", announcements, &mut failed_sections);
        let upcoming_events = settle("events", events, &mut failed_sections);
        let featured_sermons = settle("featured_sermons", sermons, &mut failed_sections);
        let verse = match verse {
            Ok(verse) => Some(verse),
            Err(e) => {
                tracing::warn!(error = %e, "Home verse unavailable");
                failed_sections.push("verse");
                None
            }
        };

        HomeView {
            carousel,
            announcements: announcements
                .into_iter()
                .enumerate()
                .map(|(i, announcement)| AnnouncementCard {
                    announcement,
                    is_new: i == 0,
                })
                .collect(),
            upcoming_events,
            featured_sermons,
            verse,
            failed_sections,
        }
    }

    /// All events, soonest first.
    pub async fn events(&self) -> Result<Vec<Event>, AppError> {
        self.cache.get_or_fetch(&self.db, &Self::events_query()).await
    }
}

fn settle<T>(
    section: &'static str,
    result: Result<Vec<T>, AppError>,
    failed: &mut Vec<&'static str>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(section, error = %e, "Home section unavailable");
        failed.push(section);
        Vec::new()
    })
}
