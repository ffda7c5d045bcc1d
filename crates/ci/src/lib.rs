//! Model extraction, intermediate representation and pipeline assembly.
//!
//! The projector turns a platform-neutral pipeline model into a concrete
//! CI configuration in four steps:
//!
//! 1. [`extract`] reads keyword-tagged graph records through the store
//!    interface and assembles the typed IR ([`ir::GlobalConfig`],
//!    [`ir::JobSpecification`]),
//! 2. a target [`emitter::Emitter`] turns the IR into ordered text
//!    fragments,
//! 3. [`placeholder::substitute`] rewrites `<<TOKEN>>` markers into the
//!    target's native expression syntax,
//! 4. [`pipeline::generate`] orchestrates the run and hands the joined
//!    text to the file writer.

#![warn(missing_docs)]

pub mod emitter;
pub mod extract;
pub mod ir;
pub mod keywords;
pub mod pipeline;
pub mod placeholder;

pub use emitter::{Emitter, EmitterRegistry};
pub use extract::extract;
pub use pipeline::{generate, render};
pub use pipewright_core::{Error, Result};
