// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, settings, credentials, sessions, password resets)
//! - Prayer requests (create, delete, atomic amen increment, live queries)
//! - Favorites (per-user sub-collection)
//! - Reference content (announcements, events, carousel, featured sermons)
//!
//! Every successful write is published on the change hub so live views
//! can re-run their query.

use crate::db::collections;
use crate::db::memory::MemoryStore;
use crate::db::query::{CollectionRef, Direction, FieldValue, Query};
use crate::error::AppError;
use crate::models::{
    ContactMessage, Credentials, FavoriteSermon, PasswordReset, PrayerRequest, SessionRecord,
    UserProfile,
};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change hub. Slow listeners that lag behind simply
/// re-query on the next event they do see.
const CHANGE_HUB_CAPACITY: usize = 256;

const DOCUMENT_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const DOCUMENT_ID_LEN: usize = 20;

/// A write landed in the named collection path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
    changes: broadcast::Sender<ChangeEvent>,
}

impl FirestoreDb {
    fn with_backend(backend: Backend) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_HUB_CAPACITY);
        Self { backend, changes }
    }

    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self::with_backend(Backend::Firestore(client)))
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self::with_backend(Backend::Firestore(client)))
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self::with_backend(Backend::Offline)
    }

    /// Create a client backed by an in-process store (tests, local demos).
    pub fn new_in_memory() -> Self {
        Self::with_backend(Backend::Memory(Arc::new(MemoryStore::new())))
    }

    /// The in-process store, when this client uses one.
    pub fn memory_store(&self) -> Option<&Arc<MemoryStore>> {
        match &self.backend {
            Backend::Memory(store) => Some(store),
            _ => None,
        }
    }

    /// Listen for writes made through this client (and its clones).
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    fn publish(&self, collection: &CollectionRef) {
        // No receivers is fine: nobody is watching.
        let _ = self.changes.send(ChangeEvent {
            collection: collection.path(),
        });
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    /// Random 20-character document ID in the same alphabet Firestore uses.
    pub fn generate_document_id() -> Result<String, AppError> {
        let mut bytes = [0u8; DOCUMENT_ID_LEN];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random generator failed")))?;
        Ok(bytes
            .iter()
            .map(|b| DOCUMENT_ID_ALPHABET[*b as usize % DOCUMENT_ID_ALPHABET.len()] as char)
            .collect())
    }

    // ─── Generic Document Operations ─────────────────────────────

    fn parent_path(
        client: &firestore::FirestoreDb,
        collection: &CollectionRef,
    ) -> Result<Option<firestore::ParentPathBuilder>, AppError> {
        collection
            .parent
            .as_ref()
            .map(|(parent_collection, parent_id)| {
                client
                    .parent_path(parent_collection, parent_id.as_str())
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .transpose()
    }

    /// Read one document.
    pub async fn get_document<T>(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let parent = Self::parent_path(client, collection)?;
                let select = client.fluent().select().by_id_in(collection.name);
                let select = match &parent {
                    Some(parent) => select.parent(parent),
                    None => select,
                };
                select
                    .obj()
                    .one(id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(store) => store
                .get(&collection.path(), id)
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create or replace a whole document.
    pub async fn set_document<T>(
        &self,
        collection: &CollectionRef,
        id: &str,
        object: &T,
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let parent = Self::parent_path(client, collection)?;
                let update = client
                    .fluent()
                    .update()
                    .in_col(collection.name)
                    .document_id(id);
                let update = match &parent {
                    Some(parent) => update.parent(parent),
                    None => update,
                };
                let _: () = update
                    .object(object)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                let value =
                    serde_json::to_value(object).map_err(|e| AppError::Database(e.to_string()))?;
                store.set(&collection.path(), id, value);
            }
            Backend::Offline => return Err(Self::offline()),
        }
        self.publish(collection);
        Ok(())
    }

    /// Create a document that must not exist yet.
    ///
    /// Fails with `AppError::Conflict` when the ID is already taken.
    async fn create_document<T>(
        &self,
        collection: &CollectionRef,
        id: &str,
        object: &T,
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let taken = || AppError::Conflict(format!("{}/{} already exists", collection.path(), id));
        match &self.backend {
            Backend::Firestore(client) => {
                let parent = Self::parent_path(client, collection)?;
                let insert = client
                    .fluent()
                    .insert()
                    .into(collection.name)
                    .document_id(id);
                let insert = match &parent {
                    Some(parent) => insert.parent(parent),
                    None => insert,
                };
                let result: Result<T, _> = insert.object(object).execute().await;
                match result {
                    Ok(_) => {}
                    Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                        return Err(taken())
                    }
                    Err(e) => return Err(AppError::Database(e.to_string())),
                }
            }
            Backend::Memory(store) => {
                let value =
                    serde_json::to_value(object).map_err(|e| AppError::Database(e.to_string()))?;
                if !store.create(&collection.path(), id, value) {
                    return Err(taken());
                }
            }
            Backend::Offline => return Err(Self::offline()),
        }
        self.publish(collection);
        Ok(())
    }

    /// Write only the given field paths (merge write); other fields stay.
    async fn merge_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: &[&str],
        object: &Value,
    ) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .fields(fields.iter().copied())
                    .in_col(collection.name)
                    .document_id(id)
                    .object(object)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => store.merge(&collection.path(), id, fields, object),
            Backend::Offline => return Err(Self::offline()),
        }
        self.publish(collection);
        Ok(())
    }

    async fn delete_document(&self, collection: &CollectionRef, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let parent = Self::parent_path(client, collection)?;
                let delete = client
                    .fluent()
                    .delete()
                    .from(collection.name)
                    .document_id(id);
                let delete = match &parent {
                    Some(parent) => delete.parent(parent),
                    None => delete,
                };
                delete
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => store.delete(&collection.path(), id),
            Backend::Offline => return Err(Self::offline()),
        }
        self.publish(collection);
        Ok(())
    }

    /// Run a filtered, ordered, limited query.
    pub async fn query<T>(&self, query: &Query) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let parent = Self::parent_path(client, &query.collection)?;
                let select = client.fluent().select().from(query.collection.name);
                let select = match &parent {
                    Some(parent) => select.parent(parent),
                    None => select,
                };

                let filters = query.filters.clone();
                let select = if filters.is_empty() {
                    select
                } else {
                    select.filter(move |q| {
                        q.for_all(filters.iter().map(|(field, value)| match value {
                            FieldValue::Str(s) => q.field(*field).eq(s.clone()),
                            FieldValue::Bool(b) => q.field(*field).eq(*b),
                            FieldValue::Int(i) => q.field(*field).eq(*i),
                        }))
                    })
                };

                let select = match query.order_by {
                    Some((field, Direction::Ascending)) => select
                        .order_by([(field, firestore::FirestoreQueryDirection::Ascending)]),
                    Some((field, Direction::Descending)) => select
                        .order_by([(field, firestore::FirestoreQueryDirection::Descending)]),
                    None => select,
                };

                let select = match query.limit {
                    Some(limit) => select.limit(limit),
                    None => select,
                };

                select
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(store) => store
                .query(query)
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Atomically add `by` to an integer field with the backend's
    /// increment transform. The document must exist.
    async fn increment_field(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> Result<(), AppError> {
        let missing = || AppError::NotFound(format!("{}/{}", collection.path(), id));
        match &self.backend {
            Backend::Firestore(client) => {
                let mut transaction = client.begin_transaction().await.map_err(|e| {
                    AppError::Database(format!("Failed to begin transaction: {}", e))
                })?;

                // Transforms create missing documents unless the write
                // requires the document to exist.
                client
                    .fluent()
                    .update()
                    .in_col(collection.name)
                    .precondition(firestore::FirestoreWritePrecondition::Exists(true))
                    .document_id(id)
                    .transforms(|t| t.fields([t.field(field).increment(by)]))
                    .only_transform()
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add increment to transaction: {}", e))
                    })?;

                match transaction.commit().await {
                    Ok(_) => {}
                    Err(firestore::errors::FirestoreError::DataNotFoundError(_)) => {
                        return Err(missing())
                    }
                    Err(e) => {
                        return Err(AppError::Database(format!("Transaction commit failed: {}", e)))
                    }
                }
            }
            Backend::Memory(store) => {
                store
                    .increment(&collection.path(), id, field, by)
                    .ok_or_else(missing)?;
            }
            Backend::Offline => return Err(Self::offline()),
        }
        self.publish(collection);
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    fn users() -> CollectionRef {
        CollectionRef::root(collections::USERS)
    }

    /// Get a user profile by auth user ID.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_document(&Self::users(), uid).await
    }

    /// Create or replace a user profile.
    pub async fn upsert_user(&self, user: &UserProfile) -> Result<(), AppError> {
        self.set_document(&Self::users(), &user.uid, user).await
    }

    /// Remove a user profile (sub-collections are left alone).
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        self.delete_document(&Self::users(), uid).await
    }

    /// Update display name and/or photo URL, leaving other fields alone.
    pub async fn update_profile_fields(
        &self,
        uid: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), AppError> {
        let mut fields = Vec::new();
        let mut object = serde_json::Map::new();
        if let Some(name) = display_name {
            fields.push("displayName");
            object.insert("displayName".to_string(), Value::from(name));
        }
        if let Some(url) = photo_url {
            fields.push("photoUrl");
            object.insert("photoUrl".to_string(), Value::from(url));
        }
        if fields.is_empty() {
            return Ok(());
        }
        self.merge_document(&Self::users(), uid, &fields, &Value::Object(object))
            .await
    }

    /// Raw `settings` map of a user document, if any.
    ///
    /// Returned untyped so a malformed value degrades per key instead of
    /// failing the read.
    pub async fn get_user_settings_raw(&self, uid: &str) -> Result<Option<Value>, AppError> {
        let doc: Option<Value> = self.get_document(&Self::users(), uid).await?;
        Ok(doc.and_then(|mut doc| doc.get_mut("settings").map(Value::take)))
    }

    /// Persist only `settings.darkMode`.
    pub async fn set_dark_mode(&self, uid: &str, dark_mode: bool) -> Result<(), AppError> {
        let object = json!({ "settings": { "darkMode": dark_mode } });
        self.merge_document(&Self::users(), uid, &["settings.darkMode"], &object)
            .await
    }

    /// Persist only the named `settings.*` paths taken from `object`.
    pub async fn merge_settings(
        &self,
        uid: &str,
        paths: &[&str],
        object: &Value,
    ) -> Result<(), AppError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.merge_document(&Self::users(), uid, paths, object)
            .await
    }

    // ─── Auth Backend Operations ─────────────────────────────────

    pub async fn get_credentials(&self, email_key: &str) -> Result<Option<Credentials>, AppError> {
        self.get_document(&CollectionRef::root(collections::CREDENTIALS), email_key)
            .await
    }

    /// Register credentials for an email that has none yet.
    ///
    /// Fails with `AppError::Conflict` if the email is already registered.
    pub async fn create_credentials(
        &self,
        email_key: &str,
        credentials: &Credentials,
    ) -> Result<(), AppError> {
        self.create_document(
            &CollectionRef::root(collections::CREDENTIALS),
            email_key,
            credentials,
        )
        .await
    }

    /// Replace the credentials of an existing account.
    pub async fn set_credentials(
        &self,
        email_key: &str,
        credentials: &Credentials,
    ) -> Result<(), AppError> {
        self.set_document(
            &CollectionRef::root(collections::CREDENTIALS),
            email_key,
            credentials,
        )
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError> {
        self.get_document(&CollectionRef::root(collections::SESSIONS), session_id)
            .await
    }

    pub async fn create_session(
        &self,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<(), AppError> {
        self.set_document(&CollectionRef::root(collections::SESSIONS), session_id, record)
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        self.delete_document(&CollectionRef::root(collections::SESSIONS), session_id)
            .await
    }

    /// Revoke every open session of a user. Returns how many were closed.
    pub async fn delete_sessions_for_user(&self, uid: &str) -> Result<usize, AppError> {
        let sessions = CollectionRef::root(collections::SESSIONS);
        let query = Query::new(sessions.clone()).filter_eq("userId", uid);
        let records: Vec<SessionRecord> = self.query(&query).await?;
        for record in &records {
            self.delete_document(&sessions, &record.id).await?;
        }
        Ok(records.len())
    }

    pub async fn get_password_reset(&self, key: &str) -> Result<Option<PasswordReset>, AppError> {
        self.get_document(&CollectionRef::root(collections::PASSWORD_RESETS), key)
            .await
    }

    pub async fn create_password_reset(
        &self,
        key: &str,
        reset: &PasswordReset,
    ) -> Result<(), AppError> {
        self.set_document(&CollectionRef::root(collections::PASSWORD_RESETS), key, reset)
            .await
    }

    pub async fn delete_password_reset(&self, key: &str) -> Result<(), AppError> {
        self.delete_document(&CollectionRef::root(collections::PASSWORD_RESETS), key)
            .await
    }

    // ─── Prayer Request Operations ───────────────────────────────

    fn prayers() -> CollectionRef {
        CollectionRef::root(collections::PRAYER_REQUESTS)
    }

    /// Public prayers, newest first.
    pub fn prayer_wall_query() -> Query {
        Query::new(Self::prayers())
            .filter_eq("isPublic", true)
            .order_by("submittedAt", Direction::Descending)
    }

    /// One user's prayers, newest first.
    pub fn prayer_journal_query(uid: &str) -> Query {
        Query::new(Self::prayers())
            .filter_eq("userId", uid)
            .order_by("submittedAt", Direction::Descending)
    }

    /// Store a new prayer request and return its document ID.
    pub async fn create_prayer(&self, prayer: &PrayerRequest) -> Result<String, AppError> {
        let id = Self::generate_document_id()?;
        self.set_document(&Self::prayers(), &id, prayer).await?;
        Ok(id)
    }

    pub async fn get_prayer(&self, id: &str) -> Result<Option<PrayerRequest>, AppError> {
        self.get_document(&Self::prayers(), id).await
    }

    pub async fn delete_prayer(&self, id: &str) -> Result<(), AppError> {
        self.delete_document(&Self::prayers(), id).await
    }

    /// Add one "amen" with the backend's atomic increment.
    pub async fn increment_amen(&self, id: &str) -> Result<(), AppError> {
        self.increment_field(&Self::prayers(), id, "amenCount", 1)
            .await
    }

    pub async fn query_prayers(&self, query: &Query) -> Result<Vec<PrayerRequest>, AppError> {
        self.query(query).await
    }

    /// Number of prayer requests a user has submitted.
    pub async fn count_prayers_for_user(&self, uid: &str) -> Result<usize, AppError> {
        let query = Query::new(Self::prayers()).filter_eq("userId", uid);
        let prayers: Vec<Value> = self.query(&query).await?;
        Ok(prayers.len())
    }

    // ─── Favorite Operations ─────────────────────────────────────

    fn favorites(uid: &str) -> CollectionRef {
        CollectionRef::nested(collections::USERS, uid, collections::FAVORITES)
    }

    fn favorite_doc_id(video_id: &str) -> String {
        urlencoding::encode(video_id).into_owned()
    }

    pub async fn get_favorite(
        &self,
        uid: &str,
        video_id: &str,
    ) -> Result<Option<FavoriteSermon>, AppError> {
        self.get_document(&Self::favorites(uid), &Self::favorite_doc_id(video_id))
            .await
    }

    pub async fn set_favorite(&self, uid: &str, favorite: &FavoriteSermon) -> Result<(), AppError> {
        self.set_document(
            &Self::favorites(uid),
            &Self::favorite_doc_id(&favorite.video_id),
            favorite,
        )
        .await
    }

    pub async fn delete_favorite(&self, uid: &str, video_id: &str) -> Result<(), AppError> {
        self.delete_document(&Self::favorites(uid), &Self::favorite_doc_id(video_id))
            .await
    }

    /// A user's favorites, most recently saved first.
    pub async fn list_favorites(&self, uid: &str) -> Result<Vec<FavoriteSermon>, AppError> {
        let query = Query::new(Self::favorites(uid)).order_by("savedAt", Direction::Descending);
        self.query(&query).await
    }

    pub async fn count_favorites(&self, uid: &str) -> Result<usize, AppError> {
        let favorites: Vec<Value> = self.query(&Query::new(Self::favorites(uid))).await?;
        Ok(favorites.len())
    }

    // ─── Contact Operations ──────────────────────────────────────

    pub async fn create_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<String, AppError> {
        let id = Self::generate_document_id()?;
        self.set_document(
            &CollectionRef::root(collections::CONTACT_MESSAGES),
            &id,
            message,
        )
        .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_offline_operations_fail() {
        let db = FirestoreDb::new_mock();
        let err = db.get_user("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let db = FirestoreDb::new_in_memory();
        let mut changes = db.subscribe_changes();

        let prayer = PrayerRequest::new("Healing".to_string(), "u1".to_string(), true, Utc::now());
        let id = db.create_prayer(&prayer).await.unwrap();
        assert_eq!(id.len(), DOCUMENT_ID_LEN);

        let event = changes.recv().await.unwrap();
        assert_eq!(event.collection, collections::PRAYER_REQUESTS);
    }

    #[tokio::test]
    async fn test_journal_query_is_newest_first_and_scoped() {
        let db = FirestoreDb::new_in_memory();
        let now = Utc::now();
        for (text, owner, age) in [("a", "u1", 3), ("b", "u1", 1), ("c", "u2", 0)] {
            let prayer = PrayerRequest::new(
                text.to_string(),
                owner.to_string(),
                false,
                now - Duration::hours(age),
            );
            db.create_prayer(&prayer).await.unwrap();
        }

        let mine = db
            .query_prayers(&FirestoreDb::prayer_journal_query("u1"))
            .await
            .unwrap();
        let texts: Vec<&str> = mine.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"]);
        assert!(mine.iter().all(|p| !p.id.is_empty()));
        assert_eq!(db.count_prayers_for_user("u2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_amen_on_missing_prayer_is_not_found() {
        let db = FirestoreDb::new_in_memory();
        let err = db.increment_amen("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
