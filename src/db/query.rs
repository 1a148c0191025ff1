//! Backend-neutral query description.
//!
//! A `Query` is the subset the app needs: equality filters, one ordering
//! field and a limit. Its `signature` doubles as the reference-data cache
//! key.

use serde_json::Value;
use std::fmt::Write as _;

/// A collection, optionally nested under a parent document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub name: &'static str,
    pub parent: Option<(&'static str, String)>,
}

impl CollectionRef {
    pub fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// `parent_collection/{parent_id}/name`
    pub fn nested(
        parent_collection: &'static str,
        parent_id: impl Into<String>,
        name: &'static str,
    ) -> Self {
        Self {
            name,
            parent: Some((parent_collection, parent_id.into())),
        }
    }

    /// Full slash-separated path.
    pub fn path(&self) -> String {
        match &self.parent {
            Some((collection, id)) => format!("{}/{}/{}", collection, id, self.name),
            None => self.name.to_string(),
        }
    }
}

/// Value an equality filter compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl FieldValue {
    /// Whether a stored JSON value equals this filter value.
    pub fn matches(&self, stored: &Value) -> bool {
        match self {
            FieldValue::Str(s) => stored.as_str() == Some(s.as_str()),
            FieldValue::Bool(b) => stored.as_bool() == Some(*b),
            FieldValue::Int(i) => stored.as_i64() == Some(*i),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Filtered, ordered, limited read of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionRef,
    pub filters: Vec<(&'static str, FieldValue)>,
    pub order_by: Option<(&'static str, Direction)>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, field: &'static str, value: impl Into<FieldValue>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    pub fn order_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.order_by = Some((field, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Stable textual key identifying this query.
    pub fn signature(&self) -> String {
        let mut sig = self.collection.path();
        for (field, value) in &self.filters {
            let _ = match value {
                FieldValue::Str(s) => write!(sig, "|{}=={:?}", field, s),
                FieldValue::Bool(b) => write!(sig, "|{}=={}", field, b),
                FieldValue::Int(i) => write!(sig, "|{}=={}", field, i),
            };
        }
        if let Some((field, direction)) = self.order_by {
            let dir = match direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            let _ = write!(sig, "|order:{}:{}", field, dir);
        }
        if let Some(limit) = self.limit {
            let _ = write!(sig, "|limit:{}", limit);
        }
        sig
    }
}
