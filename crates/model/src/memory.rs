//! In-memory store for tests and offline fixtures.

use crate::queries::ModelQuery;
use crate::record::Record;
use crate::store::ModelStore;
use async_trait::async_trait;
use pipewright_core::Result;
use std::collections::HashMap;

/// A store answering queries from a fixed table keyed by query text.
///
/// Fixtures register the exact traversal expressions the extractor will
/// issue (built via [`crate::queries`]) together with the records to
/// return. Unregistered queries answer `None`, mirroring a live store
/// where the traversal matches nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    responses: HashMap<String, Vec<Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the records a query should return.
    pub fn insert(&mut self, query: &ModelQuery, records: Vec<Record>) {
        self.responses.insert(query.text.clone(), records);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, query: &ModelQuery, records: Vec<Record>) -> Self {
        self.insert(query, records);
        self
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn query(&self, query: &ModelQuery) -> Result<Option<Vec<Record>>> {
        Ok(self.responses.get(&query.text).cloned())
    }
}
