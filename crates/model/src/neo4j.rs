//! Bolt-backed store implementation.

use crate::queries::ModelQuery;
use crate::record::Record;
use crate::store::ModelStore;
use async_trait::async_trait;
use neo4rs::Graph;
use pipewright_core::{Error, Result};
use serde_json::Value;
use tracing::debug;

/// A [`ModelStore`] speaking bolt to a Neo4j-compatible graph database.
///
/// The connection pool is acquired on [`connect`](Self::connect) and
/// released when the store is dropped, which keeps the scoped-acquisition
/// discipline of the generation entry point: the assembler owns the store
/// for exactly one run and drops it on every exit path.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect to the store.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        debug!(uri, "connecting to model store");
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| Error::store(format!("failed to connect to {uri}: {e}")))?;
        Ok(Self { graph })
    }
}

#[async_trait]
impl ModelStore for Neo4jStore {
    async fn query(&self, query: &ModelQuery) -> Result<Option<Vec<Record>>> {
        let mut stream = self
            .graph
            .execute(neo4rs::query(&query.text))
            .await
            .map_err(|e| Error::store(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| Error::store(e.to_string()))?
        {
            let mut record = Record::new();
            for &column in query.columns {
                // Bolt rows are keyed, not enumerable; probe the scalar
                // types the model uses and fall back to null for absent
                // attributes.
                if let Ok(text) = row.get::<String>(column) {
                    record.set(column, text);
                } else if let Ok(number) = row.get::<i64>(column) {
                    record.set(column, number);
                } else {
                    record.set(column, Value::Null);
                }
            }
            records.push(record);
        }

        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records))
    }
}
