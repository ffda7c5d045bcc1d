//! Intermediate representation of a pipeline model.
//!
//! The IR decouples the graph model from the target text formats: the
//! extractor populates it, the emitters read it, and it is discarded
//! after one generation run.

mod schema;

pub use schema::{CacheInstance, GlobalConfig, JobSpecification, LibraryInstance};
