//! Database layer (Firestore).

pub mod firestore;
pub mod memory;
pub mod query;

pub use firestore::{ChangeEvent, FirestoreDb};
pub use memory::MemoryStore;
pub use query::{CollectionRef, Direction, FieldValue, Query};

/// Collection names as constants.
///
/// These match the names the mobile app has always used, including the
/// capitalized `Announcements`.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-user sub-collection under `users/{uid}`
    pub const FAVORITES: &str = "favorites";
    pub const PRAYER_REQUESTS: &str = "prayerRequests";
    pub const EVENTS: &str = "events";
    pub const ANNOUNCEMENTS: &str = "Announcements";
    pub const CAROUSEL_IMAGES: &str = "carouselImages";
    pub const FEATURED_SERMONS: &str = "featuredSermons";
    pub const CONTACT_MESSAGES: &str = "contactMessages";
    /// Auth backend records (keyed by normalized email)
    pub const CREDENTIALS: &str = "credentials";
    pub const SESSIONS: &str = "sessions";
    pub const PASSWORD_RESETS: &str = "passwordResets";
}
