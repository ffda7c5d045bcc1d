//! GitLab CI document emission.
//!
//! Produces one fragment per top-level section: the `workflow:` header,
//! the projected `stages:` list, global `variables:`, then one fragment
//! per job. Every fragment is plain two-space-indented YAML; placeholder
//! rewriting happens afterwards in the assembler.

use pipewright_ci::Emitter;
use pipewright_ci::ir::{GlobalConfig, JobSpecification};
use pipewright_ci::keywords::ConfigKeyword;
use pipewright_ci::placeholder::PlaceholderRules;

fn dollar_brace(name: &str) -> String {
    format!("${{{name}}}")
}

/// GitLab's placeholder dialect. Every token family collapses to a CI/CD
/// variable reference; secrets and variables are both plain `${NAME}`
/// since GitLab resolves them through the same variables mechanism.
pub static RULES: PlaceholderRules = PlaceholderRules {
    fixed: &[
        ("BASE_OS_LINUX", "saas-linux-medium-amd64"),
        ("PIPELINE_ID", "${CI_PIPELINE_ID}"),
        ("PIPELINE_REF", "${CI_COMMIT_BRANCH}"),
        ("GIT_REPOSITORY_URL", "${CI_REPOSITORY_URL}"),
        ("CI_SERVER_URL", "${CI_SERVER_HOST}"),
        ("CI_COMMIT_SHA", "${CI_COMMIT_SHA}"),
        ("CI_EVENT_NAME", "${CI_PIPELINE_SOURCE}"),
        ("CI_PR_HEAD_SHA", "${CI_MERGE_REQUEST_SOURCE_BRANCH_SHA}"),
    ],
    secret: dollar_brace,
    env: dollar_brace,
    var: dollar_brace,
    generic: dollar_brace,
};

/// Emits `.gitlab-ci.yml` documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitLabEmitter;

impl Emitter for GitLabEmitter {
    fn target(&self) -> &'static str {
        "gitlab"
    }

    fn description(&self) -> &'static str {
        "GitLab CI pipeline configuration (.gitlab-ci.yml)"
    }

    fn rules(&self) -> &'static PlaceholderRules {
        &RULES
    }

    fn emit(&self, global: &GlobalConfig, jobs: &[JobSpecification]) -> Vec<String> {
        let mut fragments = vec![workflow_header(global)];
        if let Some(stages) = stage_list(jobs) {
            fragments.push(stages);
        }
        if let Some(variables) = variable_list(global) {
            fragments.push(variables);
        }
        for job in jobs {
            fragments.push(job_block(job, global));
        }
        fragments
    }
}

fn workflow_header(global: &GlobalConfig) -> String {
    format!("workflow:\n  name: {}", global.description)
}

/// The `stages:` list projected from the jobs, first occurrence wins.
/// Omitted entirely when no job declares a stage.
fn stage_list(jobs: &[JobSpecification]) -> Option<String> {
    let mut stages: Vec<&str> = Vec::new();
    for job in jobs {
        if let Some(stage) = job.stage.as_deref()
            && !stages.contains(&stage)
        {
            stages.push(stage);
        }
    }
    if stages.is_empty() {
        return None;
    }
    let mut lines = vec!["stages:".to_string()];
    lines.extend(stages.iter().map(|stage| format!("  - {stage}")));
    Some(lines.join("\n"))
}

fn variable_list(global: &GlobalConfig) -> Option<String> {
    if global.variables.is_empty() {
        return None;
    }
    let mut lines = vec!["variables:".to_string()];
    lines.extend(
        global
            .variables
            .iter()
            .map(|(name, value)| format!("  {name}: {value}")),
    );
    Some(lines.join("\n"))
}

fn job_block(job: &JobSpecification, global: &GlobalConfig) -> String {
    let mut lines = vec![format!("{}:", job.name)];

    if let Some(stage) = job.stage.as_deref() {
        lines.push(format!("  stage: {stage}"));
    }

    if let Some(base_os) = job.base_os.as_deref() {
        lines.push("  tags:".to_string());
        lines.push(format!("    - {base_os}"));
    }

    push_trigger_blocks(&mut lines, global);
    push_image(&mut lines, job);

    if !job.dependencies.is_empty() {
        lines.push("  needs:".to_string());
        lines.extend(job.dependencies.iter().map(|dep| format!("    - {dep}")));
    }

    push_caches(&mut lines, job);

    if let Some(timeout) = job.timeout {
        lines.push(format!("  timeout: {timeout} minutes"));
    }
    if let Some(retry) = job.retry {
        lines.push(format!("  retry: {retry}"));
    }

    // GitLab rejects jobs without a script; a diagnostic echo guarantees
    // at least one statement.
    lines.push("  script:".to_string());
    lines.push(format!("    - 'echo \"Executing Job: {}\"'", job.name));
    lines.extend(
        job.sorted_commands()
            .iter()
            .map(|(_, command)| format!("    - '{command}'")),
    );

    push_artifacts(&mut lines, job);
    push_environment(&mut lines, job);
    push_release(&mut lines, job);

    lines.join("\n")
}

/// Push-trigger projection. Inclusion filters become `only:` (guarded by
/// an explicit pipeline-source rule), exclusion filters become `except:`.
fn push_trigger_blocks(lines: &mut Vec<String>, global: &GlobalConfig) {
    let filter = |keyword: ConfigKeyword| {
        global
            .on_push
            .get(keyword.keyword())
            .filter(|patterns| !patterns.is_empty())
    };
    let inc_branches = filter(ConfigKeyword::IncludeBranches);
    let inc_files = filter(ConfigKeyword::IncludeFiles);
    let exc_branches = filter(ConfigKeyword::ExcludeBranches);
    let exc_files = filter(ConfigKeyword::ExcludeFiles);

    if inc_branches.is_some() || inc_files.is_some() {
        lines.push("  rules:".to_string());
        lines.push("    - if: ${CI_PIPELINE_SOURCE} == \"push\"".to_string());
        lines.push("  only:".to_string());
        if let Some(branches) = inc_branches {
            lines.push("    refs:".to_string());
            lines.extend(branches.iter().map(|branch| format!("      - \"{branch}\"")));
        }
        if let Some(paths) = inc_files {
            lines.push("    changes:".to_string());
            lines.extend(paths.iter().map(|path| format!("      - \"{path}\"")));
        }
    }

    if exc_branches.is_some() || exc_files.is_some() {
        lines.push("  except:".to_string());
        if let Some(branches) = exc_branches {
            lines.push("    refs:".to_string());
            lines.extend(branches.iter().map(|branch| format!("      - \"{branch}\"")));
        }
        if let Some(paths) = exc_files {
            lines.push("    changes:".to_string());
            lines.extend(paths.iter().map(|path| format!("      - \"{path}\"")));
        }
    }
}

fn push_image(lines: &mut Vec<String>, job: &JobSpecification) {
    let Some(name) = job.image.get("name") else {
        return;
    };
    lines.push("  image:".to_string());
    lines.push(format!("    name: {name}"));
    if let Some(entrypoint) = job.image.get("entryPoint") {
        lines.push(format!("    entrypoint: {entrypoint}"));
    }
}

fn push_caches(lines: &mut Vec<String>, job: &JobSpecification) {
    // Extraction guarantees keys; entries without one are dropped rather
    // than rendered with an empty key.
    let caches: Vec<_> = job
        .caches
        .iter()
        .filter_map(|cache| cache.key.as_deref().map(|key| (key, cache)))
        .collect();
    if caches.is_empty() {
        return;
    }
    lines.push("  cache:".to_string());
    for (key, cache) in caches {
        lines.push(format!("    - key: {key}"));
        if let Some(when) = cache.when.as_deref() {
            lines.push(format!("      when: {when}"));
        }
        if let Some(untracked) = cache.untracked.as_deref() {
            lines.push(format!("      untracked: {untracked}"));
        }
        if !cache.paths.is_empty() {
            lines.push("      paths:".to_string());
            lines.extend(cache.paths.iter().map(|path| format!("        - {path}")));
        }
    }
}

fn push_artifacts(lines: &mut Vec<String>, job: &JobSpecification) {
    let uploads = !job.up_artifact.is_empty() && !job.up_artifact_paths.is_empty();
    let reports = !job.report_artifact.is_empty();
    if !uploads && !reports {
        return;
    }
    lines.push("  artifacts:".to_string());

    if uploads {
        if let Some(name) = job.up_artifact.get("name") {
            lines.push(format!("    name: {name}"));
        }
        let when = job.up_artifact.get("when").map_or("on_success", String::as_str);
        lines.push(format!("    when: {when}"));
        let untracked = job
            .up_artifact
            .get("untracked")
            .map_or("false", String::as_str);
        lines.push(format!("    untracked: {untracked}"));
        if let Some(access) = job.up_artifact.get("access") {
            lines.push(format!("    access: {access}"));
        }
        if let Some(expiry) = job.up_artifact.get("expiryIn") {
            lines.push(format!("    expire_in: {expiry} days"));
        }
        lines.push("    paths:".to_string());
        lines.extend(
            job.up_artifact_paths
                .iter()
                .map(|path| format!("      - {path}")),
        );
        if !job.up_artifact_excludes.is_empty() {
            lines.push("    exclude:".to_string());
            lines.extend(
                job.up_artifact_excludes
                    .iter()
                    .map(|path| format!("      - {path}")),
            );
        }
    }

    if reports {
        lines.push("    reports:".to_string());
        lines.extend(
            job.report_artifact
                .iter()
                .map(|(kind, value)| format!("      {kind}: {value}")),
        );
    }
}

fn push_environment(lines: &mut Vec<String>, job: &JobSpecification) {
    let Some(name) = job.environment.get("name") else {
        return;
    };
    lines.push("  environment:".to_string());
    lines.push(format!("    name: {name}"));
    if let Some(url) = job.environment.get("url") {
        lines.push(format!("    url: {url}"));
    }
    if let Some(action) = job.environment.get("action") {
        lines.push(format!("    action: {action}"));
    }
    if let Some(tier) = job.environment.get("deploymentTier") {
        lines.push(format!("    deployment_tier: {tier}"));
    }
}

fn push_release(lines: &mut Vec<String>, job: &JobSpecification) {
    if job.release_paths.is_empty() {
        return;
    }
    let Some(name) = job.release.get("name") else {
        return;
    };
    lines.push("  release:".to_string());
    lines.push(format!("    name: {name}"));
    if let Some(description) = job.release.get("description") {
        lines.push(format!("    description: {description}"));
    }
    if let Some(tag) = job.release.get("releaseTag") {
        lines.push(format!("    tag_name: {tag}"));
    }
    if let Some(message) = job.release.get("tagMsg") {
        lines.push(format!("    tag_message: {message}"));
    }
    if let Some(reference) = job.release.get("releaseRef") {
        lines.push(format!("    ref: {reference}"));
    }
}
