//! IR schema types.
//!
//! Collections whose iteration order is part of the contract use
//! [`IndexMap`]/`Vec`; nothing here is an unordered map. The extractor
//! observes records in the store's native traversal order (reverse
//! declaration order) and restores declared order with exactly one
//! reversal per collection via [`GlobalConfig::restore_declared_order`] /
//! [`JobSpecification::restore_declared_order`], so emitters can print
//! every list as-is.

use indexmap::IndexMap;
use serde::Serialize;

/// Global pipeline configuration, built once per generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalConfig {
    /// Display name of the pipeline. Resolution is mandatory; a run
    /// aborts if the model carries none.
    pub description: String,

    /// Push trigger filters, keyed by qualifier keyword
    /// (included/excluded branches, included/excluded paths).
    pub on_push: IndexMap<String, Vec<String>>,

    /// Pull-request trigger filters, keyed like [`on_push`](Self::on_push)
    /// plus the PR event-type qualifier.
    pub on_pr: IndexMap<String, Vec<String>>,

    /// Global variables, names normalized to upper case.
    pub variables: IndexMap<String, String>,

    /// Global permission scopes and levels.
    pub permissions: IndexMap<String, String>,
}

impl GlobalConfig {
    /// Restore declared order on every list collected from the store.
    pub fn restore_declared_order(&mut self) {
        for patterns in self.on_push.values_mut() {
            patterns.reverse();
        }
        for patterns in self.on_pr.values_mut() {
            patterns.reverse();
        }
        self.variables.reverse();
        self.permissions.reverse();
    }
}

/// One declared job of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobSpecification {
    /// Job name, unique within the pipeline.
    pub name: String,

    /// Stage the job belongs to. A job has exactly one stage; the first
    /// statement wins.
    pub stage: Option<String>,

    /// Shell statements keyed `cmd<N>`; emission order is numeric
    /// ascending on `N`, not declaration order.
    pub commands: IndexMap<String, String>,

    /// Container image properties (`name`, optional `entryPoint`).
    pub image: IndexMap<String, String>,

    /// Job-level permission scopes.
    pub permissions: IndexMap<String, String>,

    /// Deployment environment properties.
    pub environment: IndexMap<String, String>,

    /// Release properties (name, description, tag, ...).
    pub release: IndexMap<String, String>,

    /// Upload-artifact properties (name, when, retention, ...).
    pub up_artifact: IndexMap<String, String>,

    /// Download-artifact properties.
    pub down_artifact: IndexMap<String, String>,

    /// Report artifact entries (e.g. a dotenv file passing variables).
    pub report_artifact: IndexMap<String, String>,

    /// Checkout properties (`name` ref, `depth`, `submodules`).
    pub checkout: IndexMap<String, String>,

    /// Names of jobs this job needs.
    pub dependencies: Vec<String>,

    /// Declared cache instances, one per `setCache<Name>` behavior.
    pub caches: Vec<CacheInstance>,

    /// Declared library instances, one per `setLibrary<Name>` behavior.
    pub libraries: Vec<LibraryInstance>,

    /// Paths included in the uploaded artifact.
    pub up_artifact_paths: Vec<String>,

    /// Paths excluded from the uploaded artifact.
    pub up_artifact_excludes: Vec<String>,

    /// Files attached to a release.
    pub release_paths: Vec<String>,

    /// Runner platform, sourced directly from the component usage.
    pub base_os: Option<String>,

    /// Legacy single-value checkout ref from the component usage.
    pub checkout_ref: Option<String>,

    /// Job timeout in minutes.
    pub timeout: Option<i64>,

    /// Retry count (GitLab only; the GitHub job syntax has no counterpart).
    pub retry: Option<i64>,
}

impl JobSpecification {
    /// Create an empty specification for a named job.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find or create the cache instance correlated by `id` (the full
    /// `setCache<Name>` behavior name), independent of statement order.
    pub fn cache_mut(&mut self, id: &str) -> &mut CacheInstance {
        let pos = match self.caches.iter().position(|c| c.id == id) {
            Some(pos) => pos,
            None => {
                self.caches.push(CacheInstance::new(id));
                self.caches.len() - 1
            }
        };
        &mut self.caches[pos]
    }

    /// Find or create the library instance correlated by `id`.
    pub fn library_mut(&mut self, id: &str) -> &mut LibraryInstance {
        let pos = match self.libraries.iter().position(|l| l.id == id) {
            Some(pos) => pos,
            None => {
                self.libraries.push(LibraryInstance::new(id));
                self.libraries.len() - 1
            }
        };
        &mut self.libraries[pos]
    }

    /// Commands sorted by the numeric suffix of their `cmd<N>` key.
    ///
    /// Keys are validated during extraction, so the fallback ordering for
    /// a non-numeric suffix is never reached in practice.
    #[must_use]
    pub fn sorted_commands(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .commands
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        entries.sort_by_key(|(key, _)| {
            key.strip_prefix("cmd")
                .and_then(|n| n.parse::<u64>().ok())
                .unwrap_or(u64::MAX)
        });
        entries
    }

    /// Restore declared order on every list collected from the store.
    pub fn restore_declared_order(&mut self) {
        self.dependencies.reverse();
        self.up_artifact_paths.reverse();
        self.up_artifact_excludes.reverse();
        self.release_paths.reverse();
        self.permissions.reverse();
        self.report_artifact.reverse();
        for cache in &mut self.caches {
            cache.paths.reverse();
        }
    }
}

/// One declared cache, built incrementally as its statements are
/// discovered. The `id` correlates all statements of one
/// `setCache<Name>` behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheInstance {
    /// Internal correlation id (the full behavior name). Never emitted.
    pub id: String,

    /// Cache key. Mandatory by the time extraction of the job finishes.
    pub key: Option<String>,

    /// Upload condition (`on_success`, `on_failure`, `always`).
    pub when: Option<String>,

    /// Whether untracked files are cached.
    pub untracked: Option<String>,

    /// Cached paths, declared as `path<N>` statements.
    pub paths: Vec<String>,
}

impl CacheInstance {
    /// Create an empty instance for a behavior id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// One declared third-party library (rendered as an action on GitHub),
/// correlated by its `setLibrary<Name>` behavior id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibraryInstance {
    /// Internal correlation id (the full behavior name). Never emitted.
    pub id: String,

    /// Library coordinates (e.g. `actions/setup-node`), from the
    /// behavior's `key` attribute.
    pub name: Option<String>,

    /// Library version tag, from the behavior's `version` attribute.
    pub version: Option<String>,

    /// Free-form inputs passed through to the library.
    pub inputs: IndexMap<String, String>,
}

impl LibraryInstance {
    /// Create an empty instance for a behavior id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
