//! Target emitter trait and registry.

use crate::ir::{GlobalConfig, JobSpecification};
use crate::placeholder::PlaceholderRules;
use std::collections::HashMap;
use std::sync::Arc;

/// Renders the typed IR as native configuration text for one CI target.
///
/// An emitter is a pure projection: it never touches the store, never
/// substitutes placeholders (the pipeline does that with [`rules`]) and
/// returns one text fragment per top-level document section. Fragments
/// that would be empty are omitted rather than returned blank.
///
/// [`rules`]: Emitter::rules
pub trait Emitter: Send + Sync {
    /// Stable lowercase identifier used for target selection.
    fn target(&self) -> &'static str;

    /// Short human-readable description for listings.
    fn description(&self) -> &'static str;

    /// The placeholder dialect of this target.
    fn rules(&self) -> &'static PlaceholderRules;

    /// Render the pipeline as ordered top-level fragments.
    fn emit(&self, global: &GlobalConfig, jobs: &[JobSpecification]) -> Vec<String>;
}

/// Registry mapping target identifiers to emitters.
#[derive(Default)]
pub struct EmitterRegistry {
    emitters: HashMap<&'static str, Arc<dyn Emitter>>,
}

impl EmitterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an emitter under its own target identifier.
    pub fn register(&mut self, emitter: Arc<dyn Emitter>) {
        self.emitters.insert(emitter.target(), emitter);
    }

    /// Look up an emitter by target identifier.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<Arc<dyn Emitter>> {
        self.emitters.get(target).cloned()
    }

    /// Registered target identifiers, sorted for stable listings.
    #[must_use]
    pub fn targets(&self) -> Vec<&'static str> {
        let mut targets: Vec<&'static str> = self.emitters.keys().copied().collect();
        targets.sort_unstable();
        targets
    }
}
