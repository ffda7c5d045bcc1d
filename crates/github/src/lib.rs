//! GitHub Actions target for pipewright.
//!
//! Projects the platform-neutral pipeline IR into a workflow file and
//! rewrites `<<TOKEN>>` placeholders into GitHub's `${{ ... }}`
//! expression contexts.

#![warn(missing_docs)]

pub mod workflow;

pub use workflow::GitHubEmitter;
