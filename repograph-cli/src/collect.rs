//! Turn a local checkout into an analysis input.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use repograph::{AnalysisInput, FileContent, Language, ManifestInput, SourceInput, is_manifest_path};

/// Directories that never hold first-party sources.
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    "venv",
    "__pycache__",
    "coverage",
];

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    // .git, .venv, .next, .repograph ...
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

pub fn collect_root(root: &Path) -> Result<AnalysisInput> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut input = AnalysisInput::default();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if is_manifest_path(&relative) {
            match fs::read_to_string(path) {
                Ok(content) => input.manifests.push(ManifestInput::file(relative.clone(), content)),
                Err(err) => warn!(path = %relative, error = %err, "cannot read manifest"),
            }
        }

        if Language::from_path(&relative) == Language::Unknown {
            continue;
        }
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(err) => FileContent::Bytes(err.into_bytes()),
        };
        input.files.push(SourceInput {
            path: relative,
            language: None,
            content,
        });
    }

    debug!(
        files = input.files.len(),
        manifests = input.manifests.len(),
        root = %root.display(),
        "collected checkout"
    );
    Ok(input)
}
