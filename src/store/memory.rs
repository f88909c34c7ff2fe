use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};

use crate::prelude::*;
use super::{Fields, Record, RecordStore};


/// A process-local store that just keeps all records in a list.
#[derive(Debug)]
pub(crate) struct MemoryStore {
    name: &'static str,
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            records: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_records(name: &'static str, records: Vec<Record>) -> Self {
        debug!("Seeding '{name}' store with {} records", records.len());
        Self {
            name,
            records: Mutex::new(records),
        }
    }

    // No panic can leave the list half-modified: poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryStore {
    fn fetch_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Record>>> {
        let out = self.lock().iter().find(|r| r.id == id).cloned();
        trace!(store = self.name, id, found = out.is_some(), "Fetched record by ID");
        future::ready(Ok(out)).boxed()
    }

    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Record>>> {
        future::ready(Ok(self.lock().clone())).boxed()
    }

    fn insert(&self, fields: Fields) -> Result<Record> {
        let mut records = self.lock();

        // Local IDs have to be unique within this store.
        let id = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !records.iter().any(|r| r.id == candidate) {
                break candidate;
            }
        };

        let record = Record::new(id, fields);
        records.push(record.clone());
        debug!(store = self.name, id = record.id.as_str(), "Inserted new record");

        Ok(record)
    }
}
