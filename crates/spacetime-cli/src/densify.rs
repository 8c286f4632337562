//! `spacetime densify`: fill in the dense matrix of an exported grid.

use std::path::{Path, PathBuf};

use anyhow::Context;
use spacetime_core::{AppConfig, GridArtifact};

use crate::prompt::{ask, Cancelled};

/// Relative paths are taken from the assets directory, like the names given
/// to `build --output-name`.
pub(crate) fn resolve_input(assets_dir: &Path, input_file: &Path) -> PathBuf {
    if input_file.is_absolute() || input_file.starts_with(".") || input_file.starts_with("..") {
        input_file.to_path_buf()
    } else {
        assets_dir.join(input_file)
    }
}

/// Recomputes `dense_travel_times` of the artifact at `input_file` and writes
/// it back in place.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written, or
/// [`Cancelled`] if overwriting existing dense travel times is declined.
pub(crate) fn run_densify(
    config: &AppConfig,
    input_file: &Path,
    force: bool,
) -> anyhow::Result<()> {
    let path = resolve_input(&config.assets_dir, input_file);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut artifact: GridArtifact =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    if artifact.dense_travel_times.is_some()
        && !force
        && !ask(&format!(
            "{} already has dense travel times. Overwrite?",
            path.display()
        ))
    {
        return Err(Cancelled(format!("{} left untouched", path.display())).into());
    }

    densify_artifact(&mut artifact);
    let json = serde_json::to_vec(&artifact)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    println!("OK, written to {}", path.display());
    Ok(())
}

fn densify_artifact(artifact: &mut GridArtifact) {
    artifact.densify();
    let unreachable = artifact
        .dense_travel_times
        .iter()
        .flatten()
        .flatten()
        .filter(|t| t.is_none())
        .count();
    tracing::info!(
        entries = artifact.route_matrix.len(),
        nodes = artifact.size * artifact.size,
        unreachable,
        "dense travel times computed"
    );
}
