//! GitLab CI target for pipewright.
//!
//! Projects the platform-neutral pipeline IR into a `.gitlab-ci.yml`
//! document and rewrites `<<TOKEN>>` placeholders into GitLab's
//! `${VAR}` expression syntax.

#![warn(missing_docs)]

pub mod workflow;

pub use workflow::GitLabEmitter;
