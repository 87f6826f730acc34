//! # In-Memory Document Store
//!
//! One key-ordered map per collection behind a single `RwLock`. Every
//! operation takes the lock once, so single-document writes are atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use super::errors::{StoreError, StoreResult};
use super::filter::Filter;
use super::DocumentStore;
use crate::document::Document;

type Collection = BTreeMap<String, Document>;

/// Document store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the first document matching `filter`, in key order.
    fn first_match(collection: &Collection, filter: &Filter) -> Option<String> {
        if let Some(id) = filter.as_id() {
            return collection.contains_key(id).then(|| id.to_string());
        }
        collection
            .iter()
            .find(|(_, doc)| filter.matches(doc))
            .map(|(key, _)| key.clone())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable("collection lock poisoned".to_string())
}

impl DocumentStore for InMemoryStore {
    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<String> {
        let id = document
            .id()
            .map(str::to_string)
            .ok_or_else(|| StoreError::MissingId(collection.to_string()))?;

        let mut collections = self.collections.write().map_err(poisoned)?;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                id,
            });
        }

        documents.insert(id.clone(), document);
        Ok(id)
    }

    fn update_one(&self, collection: &str, filter: &Filter, set: &Document) -> StoreResult<u64> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let Some(key) = Self::first_match(documents, filter) else {
            return Ok(0);
        };

        match documents.get_mut(&key) {
            Some(document) => {
                document.merge(set);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        Ok(Self::first_match(documents, filter)
            .and_then(|key| documents.remove(&key))
            .map_or(0, |_| 1))
    }
}
