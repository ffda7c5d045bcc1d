//! Graph model store interface for pipewright.
//!
//! The pipeline model lives in an external graph store (packages, component
//! usages, behaviors, expression statements). This crate defines the narrow
//! contract the projector needs from that store:
//!
//! - [`Record`]: an ordered bag of named scalar fields,
//! - [`ModelStore`]: a single async `query` capability returning ordered
//!   records or nothing,
//! - [`queries`]: builders for the graph traversal expressions the
//!   extractor issues.
//!
//! Two implementations ship here: [`MemoryStore`] for tests and offline
//! fixtures, and `Neo4jStore` (feature `neo4j`) speaking bolt to a live
//! database.

#![warn(missing_docs)]

pub mod memory;
#[cfg(feature = "neo4j")]
pub mod neo4j;
pub mod queries;
pub mod record;
pub mod store;

pub use memory::MemoryStore;
#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jStore;
pub use queries::ModelQuery;
pub use record::Record;
pub use store::ModelStore;
