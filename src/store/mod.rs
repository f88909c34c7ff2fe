//! The record store backing the API.
//!
//! The API never touches the records directly, it only goes through the
//! [`RecordStore`] trait. All reading operations return futures, even though
//! the only implementation we have right now (`MemoryStore`) answers
//! immediately. That way, a networked or disk-backed store can be plugged in
//! without changing any callers.

use futures::future::BoxFuture;
use serde::Serialize;

use crate::prelude::*;

mod memory;


pub(crate) use self::memory::MemoryStore;


/// The named fields of a record, e.g. `title` or `duration`.
pub(crate) type Fields = serde_json::Map<String, serde_json::Value>;

/// A single record: a flat set of named fields plus a local identifier that is
/// unique within the store holding the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Record {
    pub(crate) id: String,

    #[serde(flatten)]
    pub(crate) fields: Fields,
}

impl Record {
    pub(crate) fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self { id: id.into(), fields }
    }

    /// Returns whether the record has a field with the given name at all,
    /// regardless of its value.
    pub(crate) fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub(crate) fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.as_str()
    }

    pub(crate) fn int_field(&self, name: &str) -> Option<i64> {
        self.fields.get(name)?.as_i64()
    }

    pub(crate) fn bool_field(&self, name: &str) -> Option<bool> {
        self.fields.get(name)?.as_bool()
    }
}

/// Storage of all records of one type.
pub(crate) trait RecordStore: Send + Sync {
    /// Returns the record with the given local ID, or `None` if there is no
    /// such record.
    fn fetch_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Record>>>;

    /// Returns all records in insertion order.
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Record>>>;

    /// Creates a new record with a freshly generated local ID and the given
    /// fields. The record is visible to all other methods once this returns.
    fn insert(&self, fields: Fields) -> Result<Record>;
}

/// The two videos every fresh catalog starts with.
pub(crate) fn seed_videos() -> Vec<Record> {
    let video = |id: &str, value: serde_json::Value| {
        let serde_json::Value::Object(fields) = value else {
            unreachable!("seed video is not an object");
        };
        Record::new(id, fields)
    };

    vec![
        video("a", serde_json::json!({
            "title": "Create a GraphQL Schema",
            "duration": 120,
            "watched": true,
        })),
        video("b", serde_json::json!({
            "title": "Ember.js CLI",
            "duration": 240,
            "watched": false,
        })),
    ]
}
