//! End-to-end generation scenarios over an in-memory model store.

use pipewright_ci::{Emitter, EmitterRegistry};
use pipewright_core::Error;
use pipewright_github::GitHubEmitter;
use pipewright_gitlab::GitLabEmitter;
use pipewright_model::{MemoryStore, Record, queries};
use std::sync::Arc;

const ROOT: &str = "buildPipeline";

fn registry() -> EmitterRegistry {
    let mut registry = EmitterRegistry::new();
    registry.register(Arc::new(GitLabEmitter));
    registry.register(Arc::new(GitHubEmitter));
    registry
}

fn job_record(name: &str) -> Record {
    Record::new().with("s.name", name)
}

fn statement(name: &str, expression: &str) -> Record {
    Record::new()
        .with("e.name", name)
        .with("e.expression", expression)
}

/// One job `compile` whose only behavior is `cmd0 = make`.
fn minimal_store() -> MemoryStore {
    MemoryStore::new()
        .with(&queries::jobs_of(ROOT), vec![job_record("compile")])
        .with(
            &queries::pipeline_name_of(ROOT),
            vec![Record::new().with("q.doc", "Build")],
        )
        .with(
            &queries::job_behaviors_of(ROOT, "compile"),
            vec![Record::new().with("b.name", "executionScript")],
        )
        .with(
            &queries::job_behavior_statements_of(ROOT, "compile", "executionScript"),
            vec![statement("cmd0", "make")],
        )
}

#[tokio::test]
async fn minimal_gitlab_pipeline_renders_exactly() {
    let text = pipewright_ci::render(&minimal_store(), ROOT, &registry(), "gitlab")
        .await
        .unwrap();

    assert_eq!(
        text,
        "workflow:\n  name: Build\n\ncompile:\n  script:\n    - 'echo \"Executing Job: compile\"'\n    - 'make'\n\n"
    );
    assert!(!text.contains("stages:"));
}

#[tokio::test]
async fn github_resolves_the_linux_platform_token() {
    let mut store = minimal_store();
    store.insert(
        &queries::jobs_of(ROOT),
        vec![job_record("compile").with("s.baseOs", "<<BASE_OS_LINUX>>")],
    );

    let text = pipewright_ci::render(&store, ROOT, &registry(), "github")
        .await
        .unwrap();

    assert!(text.contains("name: Build"));
    assert!(text.contains("jobs:\n  compile:\n    runs-on: ubuntu-latest"));
    assert!(text.contains("      - run: |\n          make"));
}

#[tokio::test]
async fn unsupported_target_lists_available_platforms() {
    let error = pipewright_ci::render(&minimal_store(), ROOT, &registry(), "jenkins")
        .await
        .unwrap_err();

    match error {
        Error::UnsupportedTarget { target, available } => {
            assert_eq!(target, "jenkins");
            assert_eq!(available, "github, gitlab");
        }
        other => panic!("expected UnsupportedTarget, got {other:?}"),
    }
}

#[tokio::test]
async fn keyless_cache_aborts_generation_naming_the_job() {
    let mut store = minimal_store();
    store.insert(
        &queries::job_behaviors_of(ROOT, "compile"),
        vec![
            Record::new().with("b.name", "setCacheCargo"),
            Record::new().with("b.name", "setCacheNpm"),
        ],
    );
    store.insert(
        &queries::job_behavior_statements_of(ROOT, "compile", "setCacheCargo"),
        vec![
            Record::new()
                .with("e.name", "path0")
                .with("e.expression", "target/")
                .with("b.key", "cargo"),
        ],
    );
    store.insert(
        &queries::job_behavior_statements_of(ROOT, "compile", "setCacheNpm"),
        vec![
            Record::new()
                .with("e.name", "path0")
                .with("e.expression", "node_modules/"),
        ],
    );

    let error = pipewright_ci::render(&store, ROOT, &registry(), "gitlab")
        .await
        .unwrap_err();
    assert!(matches!(error, Error::MissingCacheKey { job } if job == "compile"));
}

#[tokio::test]
async fn declared_order_survives_reverse_store_traversal() {
    // The store hands back everything backwards; the output must read in
    // declaration order.
    let mut store = MemoryStore::new()
        .with(
            &queries::jobs_of(ROOT),
            vec![job_record("deploy"), job_record("test"), job_record("build")],
        )
        .with(
            &queries::pipeline_name_of(ROOT),
            vec![Record::new().with("q.doc", "Ordered")],
        )
        .with(&queries::job_behaviors_of(ROOT, "build"), vec![])
        .with(&queries::job_behaviors_of(ROOT, "test"), vec![])
        .with(
            &queries::job_behaviors_of(ROOT, "deploy"),
            vec![Record::new().with("b.name", "setDependencies")],
        )
        .with(
            &queries::job_behavior_statements_of(ROOT, "deploy", "setDependencies"),
            vec![statement("d1", "test"), statement("d0", "build")],
        );
    store.insert(
        &queries::trigger_statements_of(ROOT, "onPush", "includeBranches"),
        vec![statement("b1", "dev"), statement("b0", "main")],
    );

    let text = pipewright_ci::render(&store, ROOT, &registry(), "gitlab")
        .await
        .unwrap();

    let build_at = text.find("build:").unwrap();
    let test_at = text.find("test:").unwrap();
    let deploy_at = text.find("deploy:").unwrap();
    assert!(build_at < test_at && test_at < deploy_at);
    assert!(text.contains("  needs:\n    - build\n    - test"));
    assert!(text.contains("    refs:\n      - \"main\"\n      - \"dev\""));
}

#[tokio::test]
async fn substitution_is_total_for_both_targets() {
    let mut store = minimal_store();
    store.insert(
        &queries::config_statements_of(ROOT, "setGlobalVariables"),
        vec![
            statement("registry", "<<CI_SERVER_URL>>/images"),
            statement("token", "<<SECRET_DEPLOY_KEY>>"),
            statement("chained", "<<VAR_A>><<VAR_B>>"),
        ],
    );

    for target in ["gitlab", "github"] {
        let text = pipewright_ci::render(&store, ROOT, &registry(), target)
            .await
            .unwrap();
        assert!(!text.contains("<<"), "unresolved token in {target}: {text}");
        assert!(!text.contains(">>"), "unresolved token in {target}: {text}");
    }

    let gitlab = pipewright_ci::render(&store, ROOT, &registry(), "gitlab")
        .await
        .unwrap();
    assert!(gitlab.contains("TOKEN: ${DEPLOY_KEY}"));
    assert!(gitlab.contains("CHAINED: ${A}${B}"));

    let github = pipewright_ci::render(&store, ROOT, &registry(), "github")
        .await
        .unwrap();
    assert!(github.contains("TOKEN: ${{ secrets.DEPLOY_KEY }}"));
}

#[tokio::test]
async fn rendered_documents_parse_as_yaml() {
    let mut store = minimal_store();
    store.insert(
        &queries::jobs_of(ROOT),
        vec![
            job_record("compile")
                .with("s.baseOs", "ubuntu-latest")
                .with("s.timeout", 30),
        ],
    );
    store.insert(
        &queries::config_statements_of(ROOT, "setGlobalVariables"),
        vec![statement("version", "1.0")],
    );

    for target in ["gitlab", "github"] {
        let text = pipewright_ci::render(&store, ROOT, &registry(), target)
            .await
            .unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text)
            .unwrap_or_else(|e| panic!("invalid YAML for {target}: {e}\n{text}"));
        assert!(parsed.is_mapping());
    }
}

#[tokio::test]
async fn generate_writes_the_configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join(".gitlab-ci.yml");

    pipewright_ci::generate(minimal_store(), ROOT, &registry(), "gitlab", &output)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("workflow:\n  name: Build"));
    assert!(written.ends_with('\n'));
}

#[tokio::test]
async fn emitter_metadata_is_exposed() {
    assert_eq!(GitLabEmitter.target(), "gitlab");
    assert_eq!(GitHubEmitter.target(), "github");
    assert!(!GitLabEmitter.description().is_empty());
    assert!(!GitHubEmitter.description().is_empty());
}
