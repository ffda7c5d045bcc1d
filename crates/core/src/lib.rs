//! Shared error taxonomy for pipewright.
//!
//! Every crate in the workspace reports failures through the [`Error`] enum
//! defined here, so the CLI can surface a single, consistent diagnostic
//! rendering regardless of where a generation run aborts.

#![warn(missing_docs)]

pub mod error;

pub use error::{Error, Result};
