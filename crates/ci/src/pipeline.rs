//! Pipeline assembly: extract, emit, substitute, write.

use crate::emitter::EmitterRegistry;
use crate::placeholder::substitute;
use pipewright_core::{Error, Result};
use pipewright_model::ModelStore;
use std::path::Path;
use tracing::{debug, info};

/// Project one pipeline to configuration text for `target`.
///
/// Resolves the emitter before any store traffic, so an unsupported
/// target fails without touching the model. Fragments are substituted
/// independently and joined with blank lines; the result always ends
/// with a newline.
pub async fn render<S: ModelStore + ?Sized>(
    store: &S,
    root: &str,
    registry: &EmitterRegistry,
    target: &str,
) -> Result<String> {
    let emitter = registry.get(target).ok_or_else(|| Error::UnsupportedTarget {
        target: target.to_string(),
        available: registry.targets().join(", "),
    })?;

    let (global, jobs) = crate::extract(store, root).await?;
    debug!(root, target, jobs = jobs.len(), "extracted pipeline model");

    let mut parts: Vec<String> = emitter
        .emit(&global, &jobs)
        .iter()
        .map(|fragment| substitute(fragment, emitter.rules()).into_owned())
        .collect();
    parts.push(String::new());
    Ok(parts.join("\n\n"))
}

/// Render a pipeline and write it to `output`.
///
/// Takes ownership of the store so the connection is released when the
/// run finishes, successful or not.
pub async fn generate<S: ModelStore>(
    store: S,
    root: &str,
    registry: &EmitterRegistry,
    target: &str,
    output: &Path,
) -> Result<()> {
    let rendered = render(&store, root, registry, target).await;
    drop(store);
    let text = rendered?;

    tokio::fs::write(output, &text)
        .await
        .map_err(|source| Error::Io {
            source,
            path: Some(output.to_path_buf()),
        })?;
    info!(root, target, output = %output.display(), "wrote pipeline configuration");
    Ok(())
}
