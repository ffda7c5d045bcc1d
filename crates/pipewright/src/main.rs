//! pipewright CLI.
//!
//! Connects to the model database, projects one pipeline package onto
//! the selected CI target and writes the resulting configuration file.

use clap::Parser;
use pipewright_ci::EmitterRegistry;
use pipewright_github::GitHubEmitter;
use pipewright_gitlab::GitLabEmitter;
use pipewright_model::Neo4jStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pipewright", version, about = "Generate CI/CD pipeline configurations from a platform-neutral model")]
struct Cli {
    /// Name of the root package holding the pipeline model
    package_root: String,

    /// Target platform (gitlab, github)
    #[arg(short, long)]
    target: String,

    /// Path of the generated configuration file
    #[arg(short, long)]
    output: PathBuf,

    /// Bolt endpoint of the model database
    #[arg(long, env = "PIPEWRIGHT_DB_URI", default_value = "bolt://localhost:7687")]
    uri: String,

    /// Database user
    #[arg(long, env = "PIPEWRIGHT_DB_USER", default_value = "neo4j")]
    user: String,

    /// Database password
    #[arg(long, env = "PIPEWRIGHT_DB_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,
}

/// All emitters this binary ships with.
fn registry() -> EmitterRegistry {
    let mut registry = EmitterRegistry::new();
    registry.register(Arc::new(GitLabEmitter));
    registry.register(Arc::new(GitHubEmitter));
    registry
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(
        package_root = %cli.package_root,
        target = %cli.target,
        output = %cli.output.display(),
        "starting generation"
    );

    let store = Neo4jStore::connect(&cli.uri, &cli.user, &cli.password).await?;
    pipewright_ci::generate(
        store,
        &cli.package_root,
        &registry(),
        &cli.target,
        &cli.output,
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn registry_knows_both_targets() {
        let registry = registry();
        assert_eq!(registry.targets(), vec!["github", "gitlab"]);
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let cli = Cli::parse_from([
            "pipewright",
            "deployPipeline",
            "--target",
            "gitlab",
            "--output",
            ".gitlab-ci.yml",
        ]);
        assert_eq!(cli.package_root, "deployPipeline");
        assert_eq!(cli.target, "gitlab");
        assert_eq!(cli.uri, "bolt://localhost:7687");
        assert_eq!(cli.user, "neo4j");
    }
}
