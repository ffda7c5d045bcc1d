//! GitHub Actions workflow emission.
//!
//! Produces one fragment per top-level section: `name:`, `on:` triggers,
//! global `permissions:` and `env:`, then the jobs, where only the first
//! job fragment carries the `jobs:` header. Job-scoped concerns that
//! GitLab expresses as job keys (checkout, caches, artifacts, release)
//! become marketplace action steps here.

use pipewright_ci::Emitter;
use pipewright_ci::ir::{GlobalConfig, JobSpecification, LibraryInstance};
use pipewright_ci::keywords::ConfigKeyword;
use pipewright_ci::placeholder::PlaceholderRules;

/// GitHub's placeholder dialect. The three token families map onto the
/// distinct `secrets.` / `env.` / `vars.` expression contexts.
pub static RULES: PlaceholderRules = PlaceholderRules {
    fixed: &[
        ("BASE_OS_LINUX", "ubuntu-latest"),
        ("PIPELINE_ID", "${{ github.run_id }}"),
        ("PIPELINE_REF", "${{ github.ref }}"),
        ("GIT_REPOSITORY_URL", "${{ github.repositoryUrl }}"),
        ("REPO_TOKEN", "${{ secrets.GITHUB_TOKEN }}"),
        ("CI_SERVER_URL", "${GITHUB_SERVER_URL}"),
        ("CI_COMMIT_SHA", "${{ github.sha }}"),
        ("CI_EVENT_NAME", "${{ github.event_name }}"),
        ("CI_PR_HEAD_SHA", "${{ github.event.pull_request.head.sha }}"),
    ],
    secret: |name| format!("${{{{ secrets.{name} }}}}"),
    env: |name| format!("${{{{ env.{name} }}}}"),
    var: |name| format!("${{{{ vars.{name} }}}}"),
    generic: |name| format!("${{{{ {name} }}}}"),
};

const CHECKOUT_ACTION: &str = "actions/checkout@v5";
const CACHE_ACTION: &str = "actions/cache@v4";
const DOWNLOAD_ACTION: &str = "actions/download-artifact@v4";
const UPLOAD_ACTION: &str = "actions/upload-artifact@v4";
const RELEASE_ACTION: &str = "softprops/action-gh-release@v2";

/// Emits GitHub Actions workflow documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubEmitter;

impl Emitter for GitHubEmitter {
    fn target(&self) -> &'static str {
        "github"
    }

    fn description(&self) -> &'static str {
        "GitHub Actions workflow configuration"
    }

    fn rules(&self) -> &'static PlaceholderRules {
        &RULES
    }

    fn emit(&self, global: &GlobalConfig, jobs: &[JobSpecification]) -> Vec<String> {
        let mut fragments = vec![format!("name: {}", global.description)];
        if let Some(triggers) = trigger_block(global) {
            fragments.push(triggers);
        }
        if let Some(permissions) = map_block("permissions", &global.permissions) {
            fragments.push(permissions);
        }
        if let Some(env) = map_block("env", &global.variables) {
            fragments.push(env);
        }
        for (index, job) in jobs.iter().enumerate() {
            fragments.push(job_block(job, index == 0));
        }
        fragments
    }
}

fn map_block(header: &str, entries: &indexmap::IndexMap<String, String>) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut lines = vec![format!("{header}:")];
    lines.extend(entries.iter().map(|(key, value)| format!("  {key}: {value}")));
    Some(lines.join("\n"))
}

/// The `on:` block. Each trigger renders only the filter lists the model
/// declares; the whole fragment is omitted when no filter is non-empty.
fn trigger_block(global: &GlobalConfig) -> Option<String> {
    let filter = |filters: &indexmap::IndexMap<String, Vec<String>>, keyword: ConfigKeyword| {
        filters
            .get(keyword.keyword())
            .filter(|patterns| !patterns.is_empty())
            .cloned()
    };

    let push_branches = filter(&global.on_push, ConfigKeyword::IncludeBranches);
    let push_ignores = filter(&global.on_push, ConfigKeyword::ExcludeFiles);
    let pr_types = filter(&global.on_pr, ConfigKeyword::Types);
    let pr_branches = filter(&global.on_pr, ConfigKeyword::IncludeBranches);
    let pr_ignores = filter(&global.on_pr, ConfigKeyword::ExcludeFiles);

    let has_push = push_branches.is_some() || push_ignores.is_some();
    let has_pr = pr_types.is_some() || pr_branches.is_some() || pr_ignores.is_some();
    if !has_push && !has_pr {
        return None;
    }

    let mut lines = vec!["on:".to_string()];
    if has_push {
        lines.push("  push:".to_string());
        push_patterns(&mut lines, "branches", push_branches.as_deref());
        push_patterns(&mut lines, "paths-ignore", push_ignores.as_deref());
    }
    if has_pr {
        lines.push("  pull_request:".to_string());
        if let Some(types) = pr_types {
            lines.push(format!("    types: [{}]", types.join(", ")));
        }
        push_patterns(&mut lines, "branches", pr_branches.as_deref());
        push_patterns(&mut lines, "paths-ignore", pr_ignores.as_deref());
    }
    Some(lines.join("\n"))
}

fn push_patterns(lines: &mut Vec<String>, key: &str, patterns: Option<&[String]>) {
    if let Some(patterns) = patterns {
        lines.push(format!("    {key}:"));
        lines.extend(patterns.iter().map(|pattern| format!("      - '{pattern}'")));
    }
}

fn job_block(job: &JobSpecification, header: bool) -> String {
    let mut lines = Vec::new();
    if header {
        lines.push("jobs:".to_string());
    }
    lines.push(format!("  {}:", job.name));

    if let Some(base_os) = job.base_os.as_deref() {
        lines.push(format!("    runs-on: {base_os}"));
    }
    if let Some(image) = job.image.get("name") {
        lines.push("    container:".to_string());
        lines.push(format!("      image: {image}"));
    }
    if !job.permissions.is_empty() {
        lines.push("    permissions:".to_string());
        lines.extend(
            job.permissions
                .iter()
                .map(|(scope, level)| format!("      {scope}: {level}")),
        );
    }
    if !job.dependencies.is_empty() {
        lines.push("    needs:".to_string());
        lines.extend(job.dependencies.iter().map(|dep| format!("      - {dep}")));
    }
    if let Some(timeout) = job.timeout {
        lines.push(format!("    timeout-minutes: {timeout}"));
    }
    if let Some(name) = job.environment.get("name") {
        lines.push("    environment:".to_string());
        lines.push(format!("      name: {name}"));
        if let Some(url) = job.environment.get("url") {
            lines.push(format!("      url: {url}"));
        }
    }

    if has_steps(job) {
        lines.push("    steps:".to_string());
        push_checkout_step(&mut lines, job);
        push_cache_steps(&mut lines, job);
        for library in &job.libraries {
            push_library_step(&mut lines, library);
        }
        push_run_step(&mut lines, job);
        push_download_step(&mut lines, job);
        push_upload_step(&mut lines, job);
        push_release_step(&mut lines, job);
    }

    lines.join("\n")
}

/// Whether any field contributes a step. The release step deliberately
/// does not count: a job that only declares a release has nothing to
/// release and gets no `steps:` key at all.
fn has_steps(job: &JobSpecification) -> bool {
    wants_checkout(job)
        || !job.caches.is_empty()
        || !job.libraries.is_empty()
        || !job.commands.is_empty()
        || !job.down_artifact.is_empty()
        || wants_upload(job)
}

fn wants_checkout(job: &JobSpecification) -> bool {
    !job.checkout.is_empty() || job.checkout_ref.as_deref().is_some_and(|r| !r.is_empty())
}

fn wants_upload(job: &JobSpecification) -> bool {
    !job.up_artifact.is_empty() && !job.up_artifact_paths.is_empty()
}

fn push_checkout_step(lines: &mut Vec<String>, job: &JobSpecification) {
    if !wants_checkout(job) {
        return;
    }
    lines.push(format!("      - uses: {CHECKOUT_ACTION}"));
    lines.push("        with:".to_string());
    // The checkout map supersedes the legacy scalar ref.
    let reference = job
        .checkout
        .get("name")
        .map(String::as_str)
        .or(job.checkout_ref.as_deref());
    if let Some(reference) = reference {
        lines.push(format!("          ref: {reference}"));
    }
    if let Some(depth) = job.checkout.get("depth") {
        lines.push(format!("          fetch-depth: {depth}"));
    }
    if let Some(submodules) = job.checkout.get("submodules") {
        lines.push(format!("          submodules: {submodules}"));
    }
}

fn push_cache_steps(lines: &mut Vec<String>, job: &JobSpecification) {
    for cache in &job.caches {
        // Extraction guarantees keys; a keyless entry is dropped rather
        // than rendered with an empty key.
        let Some(key) = cache.key.as_deref() else {
            continue;
        };
        lines.push(format!("      - uses: {CACHE_ACTION}"));
        lines.push("        with:".to_string());
        lines.push(format!("          key: {key}"));
        if !cache.paths.is_empty() {
            lines.push("          path: |".to_string());
            lines.extend(cache.paths.iter().map(|path| format!("            '{path}'")));
        }
    }
}

fn push_library_step(lines: &mut Vec<String>, library: &LibraryInstance) {
    let (Some(name), Some(version)) = (library.name.as_deref(), library.version.as_deref()) else {
        return;
    };
    lines.push(format!("      - uses: {name}@{version}"));
    if !library.inputs.is_empty() {
        lines.push("        with:".to_string());
        lines.extend(
            library
                .inputs
                .iter()
                .map(|(key, value)| format!("          {key}: {value}")),
        );
    }
}

fn push_run_step(lines: &mut Vec<String>, job: &JobSpecification) {
    if job.commands.is_empty() {
        return;
    }
    lines.push("      - run: |".to_string());
    lines.extend(
        job.sorted_commands()
            .iter()
            .map(|(_, command)| format!("          {command}")),
    );
}

fn push_download_step(lines: &mut Vec<String>, job: &JobSpecification) {
    if job.down_artifact.is_empty() {
        return;
    }
    lines.push(format!("      - uses: {DOWNLOAD_ACTION}"));
    lines.push("        with:".to_string());
    if let Some(name) = job.down_artifact.get("name") {
        lines.push(format!("          name: {name}"));
    }
    if let Some(dest) = job.down_artifact.get("dest") {
        lines.push(format!("          path: {dest}"));
    }
}

fn push_upload_step(lines: &mut Vec<String>, job: &JobSpecification) {
    if !wants_upload(job) {
        return;
    }
    lines.push(format!("      - uses: {UPLOAD_ACTION}"));
    lines.push("        with:".to_string());
    if let Some(name) = job.up_artifact.get("name") {
        lines.push(format!("          name: {name}"));
    }
    if let Some(value) = job.up_artifact.get("ifNoFilesFound") {
        lines.push(format!("          if-no-files-found: {value}"));
    }
    if let Some(days) = job.up_artifact.get("expiryIn") {
        lines.push(format!("          retention-days: {days}"));
    }
    if let Some(level) = job.up_artifact.get("compressionLevel") {
        lines.push(format!("          compression-level: {level}"));
    }
    if let Some(overwrite) = job.up_artifact.get("overwrite") {
        lines.push(format!("          overwrite: {overwrite}"));
    }
    if let Some(hidden) = job.up_artifact.get("includeHiddenFiles") {
        lines.push(format!("          include-hidden-files: {hidden}"));
    }
    lines.push("          path: |".to_string());
    lines.extend(
        job.up_artifact_paths
            .iter()
            .map(|path| format!("            {path}")),
    );
    lines.extend(
        job.up_artifact_excludes
            .iter()
            .map(|path| format!("            !{path}")),
    );
}

fn push_release_step(lines: &mut Vec<String>, job: &JobSpecification) {
    if job.release_paths.is_empty() {
        return;
    }
    let Some(name) = job.release.get("name") else {
        return;
    };
    lines.push(format!("      - uses: {RELEASE_ACTION}"));
    lines.push("        with:".to_string());
    lines.push(format!("          name: {name}"));
    if let Some(token) = job.release.get("repoToken") {
        lines.push(format!("          token: {token}"));
    }
    if let Some(body) = job.release.get("description") {
        lines.push(format!("          body: {body}"));
    }
    if let Some(tag) = job.release.get("releaseTag") {
        lines.push(format!("          tag_name: {tag}"));
    }
    if let Some(prerelease) = job.release.get("preRelease") {
        lines.push(format!("          prerelease: {prerelease}"));
    }
    if let Some(draft) = job.release.get("draft") {
        lines.push(format!("          draft: {draft}"));
    }
    if let Some(latest) = job.release.get("makeLatest") {
        lines.push(format!("          make_latest: {latest}"));
    }
    lines.push("          files: |".to_string());
    lines.extend(
        job.release_paths
            .iter()
            .map(|path| format!("            {path}")),
    );
}
