// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-bounded cache for reference data reads.
//!
//! Entries are keyed by query signature and stored as JSON so one cache
//! serves every reference collection. Writes seen on the change hub drop
//! the entries of the collection they touched.

use crate::db::{ChangeEvent, FirestoreDb, Query};
use crate::error::AppError;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;

struct CacheEntry {
    collection: String,
    value: Value,
    stored_at: Instant,
}

/// Query-signature cache with a TTL and manual invalidation.
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Return the cached result of `query`, or run it and cache the result.
    ///
    /// Raw documents are cached (document IDs included) and decoded on
    /// every hit. Failures are never cached, so the next call retries.
    pub async fn get_or_fetch<T>(&self, db: &FirestoreDb, query: &Query) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let key = query.signature();

        let raw = match self.lookup(&key) {
            Some(hit) => hit,
            None => {
                let docs: Vec<Value> = db.query(query).await?;
                let value = Value::Array(docs);
                self.entries.insert(
                    key.clone(),
                    CacheEntry {
                        collection: query.collection.path(),
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
                value
            }
        };

        serde_json::from_value(raw).map_err(|e| {
            self.entries.remove(&key);
            AppError::Database(format!("Unreadable documents for {}: {}", key, e))
        })
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove(key);
        None
    }

    /// Drop every entry for one collection path.
    pub fn invalidate(&self, collection: &str) {
        self.entries.retain(|_, entry| entry.collection != collection);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invalidate entries as writes arrive on the change hub.
    ///
    /// Runs until the hub closes. If the listener falls behind, the whole
    /// cache is cleared since the missed events are unknown.
    pub fn spawn_invalidator(&self, db: &FirestoreDb) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        let mut changes = db.subscribe_changes();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(ChangeEvent { collection }) => cache.invalidate(&collection),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Cache invalidator lagged, clearing cache");
                        cache.clear();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Per-user in-memory state, dropped once it has gone unused for
/// `max_idle`. `evict_idle` is run periodically by the owner.
#[derive(Clone)]
pub struct IdleMap<V> {
    entries: Arc<DashMap<String, IdleEntry<V>>>,
    max_idle: Duration,
}

struct IdleEntry<V> {
    value: V,
    last_used: Instant,
}

impl<V: Clone> IdleMap<V> {
    pub fn new(max_idle: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_idle,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entry = self.entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Some(entry.value.clone())
    }

    /// The existing value, or `value` if there is none yet.
    pub fn get_or_insert(&self, key: &str, value: V) -> V {
        self.update(key, || value, |current| current.clone())
    }

    /// Run `f` on the value for `key` (created with `default` if absent)
    /// while holding the entry lock.
    pub fn update<R>(
        &self,
        key: &str,
        default: impl FnOnce() -> V,
        f: impl FnOnce(&mut V) -> R,
    ) -> R {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| IdleEntry {
                value: default(),
                last_used: Instant::now(),
            });
        entry.last_used = Instant::now();
        f(&mut entry.value)
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop entries unused for longer than `max_idle`. Returns how many.
    pub fn evict_idle(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.last_used.elapsed() < self.max_idle);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
