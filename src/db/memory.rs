//! In-process document store used by tests and local runs.
//!
//! Mirrors the Firestore behavior the app relies on: documents are JSON
//! maps, reads expose the document ID as `_firestore_id`, queries drop
//! documents missing the ordering field, and `increment` is atomic per
//! document.

use crate::db::query::{Direction, Query};
use crate::time_utils::parse_utc;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Field name under which reads expose the document ID.
pub const DOCUMENT_ID_FIELD: &str = "_firestore_id";

/// Collections keyed by full path, documents keyed by ID.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Value>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of document writes (create, replace, merge, delete, increment).
    pub fn write_count(&self) -> u64 {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Number of reads (single-document gets and queries).
    pub fn read_count(&self) -> u64 {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
            .map(|doc| with_id(doc, id))
    }

    /// Create or replace a whole document.
    pub fn set(&self, collection: &str, id: &str, doc: Value) {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    /// Create a document only if the ID is free. Returns `false` (and
    /// writes nothing) when it is already taken.
    pub fn create(&self, collection: &str, id: &str, doc: Value) -> bool {
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        match docs.entry(id.to_string()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(doc);
                self.writes.fetch_add(1, AtomicOrdering::SeqCst);
                true
            }
        }
    }

    /// Copy the given (dot-separated) field paths from `source` into the
    /// document, creating it if needed. Other fields are left untouched.
    pub fn merge(&self, collection: &str, id: &str, fields: &[&str], source: &Value) {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        let doc = docs
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        for path in fields {
            match lookup(source, path) {
                Some(value) => set_path(doc, path, value.clone()),
                None => remove_path(doc, path),
            }
        }
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub fn delete(&self, collection: &str, id: &str) {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
    }

    /// Atomically add `by` to an integer field. Returns the new value, or
    /// `None` if the document does not exist.
    pub fn increment(&self, collection: &str, id: &str, field: &str, by: i64) -> Option<i64> {
        let mut docs = self.collections.get_mut(collection)?;
        let doc = docs.get_mut(id)?;
        let current = lookup(doc, field).and_then(Value::as_i64).unwrap_or(0);
        let updated = current + by;
        set_path(doc, field, Value::from(updated));
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Some(updated)
    }

    pub fn query(&self, query: &Query) -> Vec<Value> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        let Some(docs) = self.collections.get(&query.collection.path()) else {
            return Vec::new();
        };

        let mut matching: Vec<(String, Value)> = docs
            .iter()
            .filter(|(_, doc)| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| lookup(doc, field).is_some_and(|v| value.matches(v)))
            })
            .filter(|(_, doc)| {
                query
                    .order_by
                    .is_none_or(|(field, _)| lookup(doc, field).is_some())
            })
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();
        drop(docs);

        if let Some((field, direction)) = query.order_by {
            matching.sort_by(|(_, a), (_, b)| {
                let ordering = match (lookup(a, field), lookup(b, field)) {
                    (Some(a), Some(b)) => compare_values(a, b),
                    _ => Ordering::Equal,
                };
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matching.truncate(limit as usize);
        }

        matching
            .into_iter()
            .map(|(id, doc)| with_id(doc, &id))
            .collect()
    }
}

fn with_id(mut doc: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut doc {
        map.insert(DOCUMENT_ID_FIELD.to_string(), Value::String(id.to_string()));
    }
    doc
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, key| current.get(key))
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut keys: Vec<&str> = path.split('.').collect();
    let Some(last) = keys.pop() else {
        return;
    };
    let mut current = doc;
    for key in keys {
        current = as_object(current)
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object(current).insert(last.to_string(), value);
}

/// Replace non-object values with an empty object and return the map.
fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value
        .as_object_mut()
        .expect("value was just replaced with an object")
}

fn remove_path(doc: &mut Value, path: &str) {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => {
            let parent = parent.split('.').try_fold(&mut *doc, |v, k| v.get_mut(k));
            (parent, last)
        }
        None => (Some(doc), path),
    };
    if let Some(Value::Object(map)) = parent {
        map.remove(last);
    }
}

/// Firestore-like ordering for the value types the app stores.
/// Strings that parse as RFC3339 compare as instants.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => match (parse_utc(x), parse_utc(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
