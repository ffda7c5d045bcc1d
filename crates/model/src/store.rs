//! The store query contract.

use crate::queries::ModelQuery;
use crate::record::Record;
use async_trait::async_trait;
use pipewright_core::Result;

/// A graph model store exposing a single query capability.
///
/// `query` returns the ordered list of records matching a traversal
/// expression, or `None` when the traversal matches nothing. Absence is
/// not an error: most configuration keywords are optional and the
/// extractor simply skips them. Queries are idempotent reads; the
/// projector issues them strictly serialized, one at a time.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Run a traversal expression against the store.
    ///
    /// # Errors
    ///
    /// Returns [`pipewright_core::Error::Store`] when the store itself
    /// fails (connection loss, malformed traversal). A traversal that
    /// merely matches nothing yields `Ok(None)`.
    async fn query(&self, query: &ModelQuery) -> Result<Option<Vec<Record>>>;
}

#[async_trait]
impl<S: ModelStore + ?Sized> ModelStore for &S {
    async fn query(&self, query: &ModelQuery) -> Result<Option<Vec<Record>>> {
        (**self).query(query).await
    }
}
