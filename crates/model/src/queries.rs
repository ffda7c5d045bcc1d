//! Graph traversal expressions for the pipeline model.
//!
//! The model is stored as `Package` nodes owning `SWComponentUsage`,
//! `Behavior` and `ExpressionStatement` nodes through `OWNEDRELATIONSHIP`
//! edges. Jobs live under a `jobs` sub-package, the pipeline name under a
//! `meta` sub-package, and the global trigger/variable configuration under
//! a `configurePipeline` component usage.

/// Sub-package holding the job component usages.
pub const JOBS_PACKAGE: &str = "jobs";

/// Sub-package holding pipeline metadata.
pub const META_PACKAGE: &str = "meta";

/// Attribute on the meta package carrying the pipeline display name.
pub const DOC_ATTRIBUTE: &str = "doc";

/// Component usage holding the global pipeline configuration behaviors.
pub const CONFIG_ROOT: &str = "configurePipeline";

/// A traversal expression together with the columns its records expose.
///
/// Store implementations only need the text; the column list lets generic
/// drivers (bolt rows are keyed, not enumerable) materialize [`Record`]s
/// without knowing each query's shape.
///
/// [`Record`]: crate::Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelQuery {
    /// The traversal expression sent to the store.
    pub text: String,
    /// Field names present on each returned record.
    pub columns: &'static [&'static str],
}

/// All job component usages under the root package's `jobs` sub-package.
#[must_use]
pub fn jobs_of(root: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (q:Package {{name: '{JOBS_PACKAGE}'}})-[:OWNEDRELATIONSHIP]->(s:SWComponentUsage) \
             return s.name, s.baseOs, s.checkoutRef, s.timeout, s.retry"
        ),
        columns: &["s.name", "s.baseOs", "s.checkoutRef", "s.timeout", "s.retry"],
    }
}

/// The pipeline display name from the `meta` sub-package.
#[must_use]
pub fn pipeline_name_of(root: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (q:Package {{name: '{META_PACKAGE}'}}) return q.{DOC_ATTRIBUTE}"
        ),
        columns: &["q.doc"],
    }
}

/// Names (plus key/version attributes) of all behaviors declared on a job.
#[must_use]
pub fn job_behaviors_of(root: &str, job: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (q:Package {{name: '{JOBS_PACKAGE}'}})-[:OWNEDRELATIONSHIP]->\
             (s:SWComponentUsage {{name: '{job}'}})-[:OWNEDRELATIONSHIP]->(b:Behavior) \
             return b.name, b.key, b.version"
        ),
        columns: &["b.name", "b.key", "b.version"],
    }
}

/// Expression statements of one named behavior on a job.
#[must_use]
pub fn job_behavior_statements_of(root: &str, job: &str, behavior: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (q:Package {{name: '{JOBS_PACKAGE}'}})-[:OWNEDRELATIONSHIP]->\
             (s:SWComponentUsage {{name: '{job}'}})-[:OWNEDRELATIONSHIP]->\
             (b:Behavior {{name: '{behavior}'}})-[:OWNEDRELATIONSHIP]->(e:ExpressionStatement) \
             return e.name, e.expression, b.name, b.key, b.version"
        ),
        columns: &["e.name", "e.expression", "b.name", "b.key", "b.version"],
    }
}

/// Expression statements of a behavior directly under the configuration
/// component usage (global variables, permissions).
#[must_use]
pub fn config_statements_of(root: &str, behavior: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (s:SWComponentUsage {{name: '{CONFIG_ROOT}'}})-[:OWNEDRELATIONSHIP]->\
             (b:Behavior {{name: '{behavior}'}})-[:OWNEDRELATIONSHIP]->(e:ExpressionStatement) \
             return e.name, e.expression"
        ),
        columns: &["e.name", "e.expression"],
    }
}

/// Expression statements of a filter-qualifier behavior nested inside a
/// trigger component usage (`onPush`/`onPullRequest`).
#[must_use]
pub fn trigger_statements_of(root: &str, trigger: &str, qualifier: &str) -> ModelQuery {
    ModelQuery {
        text: format!(
            "match (p:Package {{name: '{root}'}})-[:OWNEDRELATIONSHIP]->\
             (s:SWComponentUsage {{name: '{CONFIG_ROOT}'}})-[:OWNEDRELATIONSHIP]->\
             (s2:SWComponentUsage {{name: '{trigger}'}})-[:OWNEDRELATIONSHIP]->\
             (b:Behavior {{name: '{qualifier}'}})-[:OWNEDRELATIONSHIP]->(e:ExpressionStatement) \
             return e.name, e.expression"
        ),
        columns: &["e.name", "e.expression"],
    }
}
