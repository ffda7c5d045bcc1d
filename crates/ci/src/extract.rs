//! Record extraction: loosely-structured store records to typed IR.
//!
//! Extraction proceeds strictly serialized: one query in flight, job by
//! job, behavior by behavior, in the order the store returns them. All
//! reads are idempotent; the only side effect is the returned IR.

use crate::ir::{GlobalConfig, JobSpecification};
use crate::keywords::{BehaviorKind, ConfigKeyword};
use indexmap::IndexMap;
use pipewright_core::{Error, Result};
use pipewright_model::{ModelStore, Record, queries};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

#[allow(clippy::expect_used)]
static COMMAND_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cmd\d+$").expect("literal pattern is valid"));

/// Extract the typed IR for one pipeline.
///
/// Returns the global configuration and the jobs in declared order, or
/// fails fatally on a missing pipeline name or a modeling-contract
/// violation. Optional data that is simply absent never raises.
pub async fn extract<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
) -> Result<(GlobalConfig, Vec<JobSpecification>)> {
    let mut jobs = seed_jobs(store, root).await?;
    debug!(root, jobs = jobs.len(), "seeded job specifications");

    let mut global = GlobalConfig {
        description: resolve_pipeline_name(store, root).await?,
        ..GlobalConfig::default()
    };
    collect_global_config(store, root, &mut global).await?;

    for job in &mut jobs {
        collect_job(store, root, job).await?;
    }

    // The store traverses ownership edges in reverse declaration order;
    // one reversal per collection restores the declared order.
    jobs.reverse();
    global.restore_declared_order();
    for job in &mut jobs {
        job.restore_declared_order();
    }

    Ok((global, jobs))
}

/// Seed one [`JobSpecification`] per component usage under the `jobs`
/// sub-package, carrying the scalar attributes of the usage itself.
async fn seed_jobs<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
) -> Result<Vec<JobSpecification>> {
    let Some(records) = store.query(&queries::jobs_of(root)).await? else {
        return Ok(Vec::new());
    };

    let mut jobs = Vec::with_capacity(records.len());
    for record in records {
        let Some(name) = record.get_str("s.name") else {
            trace!(root, "skipping job record without a name");
            continue;
        };
        let mut job = JobSpecification::new(name);
        job.base_os = record.get_str("s.baseOs").map(str::to_string);
        job.checkout_ref = record.get_str("s.checkoutRef").map(str::to_string);
        job.timeout = record.get_i64("s.timeout");
        job.retry = record.get_i64("s.retry");
        jobs.push(job);
    }
    Ok(jobs)
}

/// Resolve the mandatory pipeline display name from the meta sub-package.
async fn resolve_pipeline_name<S: ModelStore + ?Sized>(store: &S, root: &str) -> Result<String> {
    let records = store.query(&queries::pipeline_name_of(root)).await?;
    records
        .as_deref()
        .and_then(<[Record]>::first)
        .and_then(|record| record.get_str("q.doc"))
        .filter(|doc| !doc.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::PipelineNotFound {
            package: root.to_string(),
        })
}

/// Walk the fixed configuration keyword table; trigger keywords recurse
/// over the filter-qualifier sub-table. Absent keywords are skipped.
async fn collect_global_config<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
    global: &mut GlobalConfig,
) -> Result<()> {
    for keyword in ConfigKeyword::ALL {
        match keyword {
            ConfigKeyword::Push => {
                collect_trigger(store, root, keyword, &mut global.on_push).await?;
            }
            ConfigKeyword::PullRequest => {
                collect_trigger(store, root, keyword, &mut global.on_pr).await?;
            }
            ConfigKeyword::Variables => {
                let query = queries::config_statements_of(root, keyword.keyword());
                let Some(statements) = store.query(&query).await? else {
                    continue;
                };
                for statement in statements {
                    if let (Some(name), Some(value)) = (
                        statement.get_str("e.name"),
                        statement.get_str("e.expression"),
                    ) {
                        global
                            .variables
                            .insert(name.to_uppercase(), value.to_string());
                    }
                }
            }
            ConfigKeyword::Permissions => {
                let query = queries::config_statements_of(root, keyword.keyword());
                let Some(statements) = store.query(&query).await? else {
                    continue;
                };
                for statement in statements {
                    if let (Some(scope), Some(level)) = (
                        statement.get_str("e.name"),
                        statement.get_str("e.expression"),
                    ) {
                        global
                            .permissions
                            .insert(scope.to_string(), level.to_string());
                    }
                }
            }
            // Filter qualifiers are only meaningful nested under a trigger.
            _ => {}
        }
    }
    Ok(())
}

/// Collect the filter-qualifier lists nested inside one trigger component.
async fn collect_trigger<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
    trigger: ConfigKeyword,
    filters: &mut IndexMap<String, Vec<String>>,
) -> Result<()> {
    for qualifier in ConfigKeyword::FILTER_QUALIFIERS {
        let query = queries::trigger_statements_of(root, trigger.keyword(), qualifier.keyword());
        let Some(statements) = store.query(&query).await? else {
            continue;
        };
        let patterns: Vec<String> = statements
            .iter()
            .filter_map(|statement| statement.get_str("e.expression"))
            .filter(|pattern| !pattern.is_empty())
            .map(str::to_string)
            .collect();
        if !patterns.is_empty() {
            filters.insert(qualifier.keyword().to_string(), patterns);
        }
    }
    Ok(())
}

/// Fetch a job's behavior names and route every statement into the IR.
async fn collect_job<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
    job: &mut JobSpecification,
) -> Result<()> {
    let behaviors = store
        .query(&queries::job_behaviors_of(root, &job.name))
        .await?
        .ok_or_else(|| Error::BehaviorListUnavailable {
            job: job.name.clone(),
        })?;

    for behavior in behaviors {
        let Some(name) = behavior.get_str("b.name") else {
            continue;
        };
        let Some(kind) = BehaviorKind::classify(name) else {
            trace!(job = %job.name, behavior = name, "skipping unknown behavior");
            continue;
        };
        let query = queries::job_behavior_statements_of(root, &job.name, name);
        let Some(statements) = store.query(&query).await? else {
            continue;
        };
        if statements.is_empty() {
            continue;
        }
        apply_behavior(job, kind, name, &statements)?;
    }

    // Every declared cache must have acquired a key by now, no matter in
    // which order its statements were discovered.
    for cache in &job.caches {
        if cache.key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::MissingCacheKey {
                job: job.name.clone(),
            });
        }
    }

    Ok(())
}

/// Route one behavior's statements into the matching IR fields.
fn apply_behavior(
    job: &mut JobSpecification,
    kind: BehaviorKind,
    behavior_name: &str,
    statements: &[Record],
) -> Result<()> {
    match kind {
        BehaviorKind::Stage => {
            // A job belongs to exactly one stage; the first statement wins.
            if job.stage.is_none() {
                job.stage = statements
                    .iter()
                    .find_map(|s| s.get_str("e.expression"))
                    .filter(|stage| !stage.is_empty())
                    .map(str::to_string);
            }
        }
        BehaviorKind::Exec => {
            for statement in statements {
                let key = statement.get_str("e.name").unwrap_or_default();
                if !COMMAND_KEY.is_match(key) {
                    return Err(Error::InvalidCommandKey {
                        job: job.name.clone(),
                        key: key.to_string(),
                    });
                }
                if let Some(value) = statement.get_str("e.expression")
                    && !value.is_empty()
                {
                    job.commands.insert(key.to_string(), value.to_string());
                }
            }
        }
        BehaviorKind::Dependencies => {
            for statement in statements {
                if let Some(needed) = statement.get_str("e.expression")
                    && !needed.is_empty()
                {
                    job.dependencies.push(needed.to_string());
                }
            }
        }
        BehaviorKind::Permissions => {
            merge_pairs(&mut job.permissions, statements);
        }
        BehaviorKind::Image => {
            merge_pairs(&mut job.image, statements);
        }
        BehaviorKind::BuildArtifact => {
            for statement in statements {
                let (Some(key), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) else {
                    continue;
                };
                if key.starts_with("path") {
                    job.up_artifact_paths.push(value.to_string());
                } else if key.starts_with("exclude") {
                    job.up_artifact_excludes.push(value.to_string());
                } else {
                    job.up_artifact.insert(key.to_string(), value.to_string());
                }
            }
        }
        BehaviorKind::DownloadArtifact => {
            merge_pairs(&mut job.down_artifact, statements);
        }
        BehaviorKind::Environment => {
            merge_pairs(&mut job.environment, statements);
        }
        BehaviorKind::Release => {
            for statement in statements {
                let (Some(key), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) else {
                    continue;
                };
                if key.starts_with("path") {
                    job.release_paths.push(value.to_string());
                } else {
                    job.release.insert(key.to_string(), value.to_string());
                }
            }
        }
        BehaviorKind::Report => {
            for statement in statements {
                let (Some(key), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) else {
                    continue;
                };
                // Upload conditions declared on the report behavior apply
                // to the surrounding artifact block.
                if key == "when" || key == "untracked" {
                    job.up_artifact.insert(key.to_string(), value.to_string());
                } else {
                    job.report_artifact
                        .insert(key.to_string(), value.to_string());
                }
            }
        }
        BehaviorKind::Checkout => {
            for statement in statements {
                if let Some(reference) = statement.get_str("b.key")
                    && !reference.is_empty()
                {
                    job.checkout
                        .insert("name".to_string(), reference.to_string());
                }
                if let (Some(key), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) && !key.is_empty()
                    && !value.is_empty()
                {
                    job.checkout.insert(key.to_string(), value.to_string());
                }
            }
        }
        BehaviorKind::Cache => {
            for statement in statements {
                let cache = job.cache_mut(behavior_name);
                if let Some(key) = statement.get_str("b.key")
                    && !key.is_empty()
                {
                    cache.key = Some(key.to_string());
                }
                let (Some(name), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                if name == "when" {
                    cache.when = Some(value.to_string());
                } else if name == "untracked" {
                    cache.untracked = Some(value.to_string());
                } else if name.starts_with("path") {
                    cache.paths.push(value.to_string());
                }
            }
        }
        BehaviorKind::Library => {
            for statement in statements {
                let library = job.library_mut(behavior_name);
                if let Some(name) = statement.get_str("b.key")
                    && !name.is_empty()
                {
                    library.name = Some(name.to_string());
                }
                if let Some(version) = statement.get_str("b.version")
                    && !version.is_empty()
                {
                    library.version = Some(version.to_string());
                }
                if let (Some(key), Some(value)) = (
                    statement.get_str("e.name"),
                    statement.get_str("e.expression"),
                ) && !key.is_empty()
                    && !value.is_empty()
                {
                    library.inputs.insert(key.to_string(), value.to_string());
                }
            }
        }
    }
    Ok(())
}

/// Merge plain `name = expression` statements into an ordered map.
fn merge_pairs(into: &mut IndexMap<String, String>, statements: &[Record]) {
    for statement in statements {
        if let (Some(key), Some(value)) = (
            statement.get_str("e.name"),
            statement.get_str("e.expression"),
        ) && !key.is_empty()
        {
            into.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipewright_model::MemoryStore;
    use serde_json::Value;

    const ROOT: &str = "testPipeline";

    fn job_record(name: &str) -> Record {
        Record::new()
            .with("s.name", name)
            .with("s.baseOs", Value::Null)
            .with("s.checkoutRef", Value::Null)
            .with("s.timeout", Value::Null)
            .with("s.retry", Value::Null)
    }

    fn statement(name: &str, expression: &str) -> Record {
        Record::new()
            .with("e.name", name)
            .with("e.expression", expression)
    }

    fn behavior_statement(behavior: &str, key: &str, name: &str, expression: &str) -> Record {
        Record::new()
            .with("e.name", name)
            .with("e.expression", expression)
            .with("b.name", behavior)
            .with("b.key", key)
            .with("b.version", Value::Null)
    }

    fn named_store(jobs: Vec<Record>) -> MemoryStore {
        MemoryStore::new()
            .with(&queries::jobs_of(ROOT), jobs)
            .with(
                &queries::pipeline_name_of(ROOT),
                vec![Record::new().with("q.doc", "Build")],
            )
    }

    #[tokio::test]
    async fn missing_pipeline_name_is_fatal() {
        let store = MemoryStore::new().with(&queries::jobs_of(ROOT), vec![]);

        let error = extract(&store, ROOT).await.unwrap_err();
        assert!(matches!(error, Error::PipelineNotFound { package } if package == ROOT));
    }

    #[tokio::test]
    async fn missing_behavior_list_is_fatal() {
        let store = named_store(vec![job_record("compile")]);

        let error = extract(&store, ROOT).await.unwrap_err();
        assert!(matches!(error, Error::BehaviorListUnavailable { job } if job == "compile"));
    }

    #[tokio::test]
    async fn malformed_command_key_is_fatal() {
        let mut store = named_store(vec![job_record("compile")]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "compile"),
            vec![Record::new().with("b.name", "executionScript")],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "compile", "executionScript"),
            vec![statement("step1", "make")],
        );

        let error = extract(&store, ROOT).await.unwrap_err();
        assert!(
            matches!(error, Error::InvalidCommandKey { job, key } if job == "compile" && key == "step1")
        );
    }

    #[tokio::test]
    async fn keyless_cache_instance_is_fatal() {
        let mut store = named_store(vec![job_record("compile")]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "compile"),
            vec![
                Record::new().with("b.name", "setCacheCargo"),
                Record::new().with("b.name", "setCacheNpm"),
            ],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "compile", "setCacheCargo"),
            vec![behavior_statement("setCacheCargo", "cargo", "path0", "target/")],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "compile", "setCacheNpm"),
            vec![behavior_statement("setCacheNpm", "", "path0", "node_modules/")],
        );

        let error = extract(&store, ROOT).await.unwrap_err();
        assert!(matches!(error, Error::MissingCacheKey { job } if job == "compile"));
    }

    #[tokio::test]
    async fn jobs_and_lists_come_back_in_declared_order() {
        // The store returns everything in reverse declaration order.
        let mut store = named_store(vec![job_record("test"), job_record("build")]);
        store.insert(&queries::job_behaviors_of(ROOT, "build"), vec![]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "test"),
            vec![Record::new().with("b.name", "setDependencies")],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "test", "setDependencies"),
            vec![statement("dep1", "lint"), statement("dep0", "build")],
        );
        store.insert(
            &queries::trigger_statements_of(ROOT, "onPush", "includeBranches"),
            vec![statement("b1", "dev"), statement("b0", "main")],
        );

        let (global, jobs) = extract(&store, ROOT).await.unwrap();

        let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["build", "test"]);
        assert_eq!(jobs[1].dependencies, vec!["build", "lint"]);
        assert_eq!(global.on_push["includeBranches"], vec!["main", "dev"]);
    }

    #[tokio::test]
    async fn global_variables_are_upper_cased_and_ordered() {
        let mut store = named_store(vec![]);
        store.insert(
            &queries::config_statements_of(ROOT, "setGlobalVariables"),
            vec![statement("build_dir", "out/"), statement("version", "1.0")],
        );

        let (global, _) = extract(&store, ROOT).await.unwrap();

        let entries: Vec<(&str, &str)> = global
            .variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        // Store order reversed once to restore declaration order.
        assert_eq!(entries, vec![("VERSION", "1.0"), ("BUILD_DIR", "out/")]);
    }

    #[tokio::test]
    async fn dynamic_instances_merge_across_statements() {
        let mut store = named_store(vec![job_record("build")]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "build"),
            vec![
                Record::new().with("b.name", "setLibraryNode"),
                Record::new().with("b.name", "setCacheCargo"),
            ],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "build", "setLibraryNode"),
            vec![
                Record::new()
                    .with("e.name", "node-version")
                    .with("e.expression", "20")
                    .with("b.name", "setLibraryNode")
                    .with("b.key", "actions/setup-node")
                    .with("b.version", "v4"),
            ],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "build", "setCacheCargo"),
            vec![
                behavior_statement("setCacheCargo", "cargo", "path1", "registry/"),
                behavior_statement("setCacheCargo", "cargo", "path0", "target/"),
                behavior_statement("setCacheCargo", "cargo", "when", "on_success"),
            ],
        );

        let (_, jobs) = extract(&store, ROOT).await.unwrap();
        let job = &jobs[0];

        assert_eq!(job.libraries.len(), 1);
        assert_eq!(job.libraries[0].name.as_deref(), Some("actions/setup-node"));
        assert_eq!(job.libraries[0].version.as_deref(), Some("v4"));
        assert_eq!(
            job.libraries[0].inputs.get("node-version").map(String::as_str),
            Some("20")
        );

        assert_eq!(job.caches.len(), 1);
        assert_eq!(job.caches[0].key.as_deref(), Some("cargo"));
        assert_eq!(job.caches[0].when.as_deref(), Some("on_success"));
        assert_eq!(job.caches[0].paths, vec!["target/", "registry/"]);
    }

    #[tokio::test]
    async fn report_conditions_fold_into_upload_artifact() {
        let mut store = named_store(vec![job_record("build")]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "build"),
            vec![Record::new().with("b.name", "setReportArtifact")],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "build", "setReportArtifact"),
            vec![
                statement("dotenv", "build.env"),
                statement("when", "always"),
            ],
        );

        let (_, jobs) = extract(&store, ROOT).await.unwrap();
        let job = &jobs[0];

        assert_eq!(job.up_artifact.get("when").map(String::as_str), Some("always"));
        assert_eq!(
            job.report_artifact.get("dotenv").map(String::as_str),
            Some("build.env")
        );
    }

    #[tokio::test]
    async fn stage_first_statement_wins() {
        let mut store = named_store(vec![job_record("build")]);
        store.insert(
            &queries::job_behaviors_of(ROOT, "build"),
            vec![Record::new().with("b.name", "setStage")],
        );
        store.insert(
            &queries::job_behavior_statements_of(ROOT, "build", "setStage"),
            vec![statement("s", "compile"), statement("s", "deploy")],
        );

        let (_, jobs) = extract(&store, ROOT).await.unwrap();
        assert_eq!(jobs[0].stage.as_deref(), Some("compile"));
    }
}
