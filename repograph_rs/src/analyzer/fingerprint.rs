//! Content fingerprint of an analysis input.
//!
//! SHA-256 over the normalized `(path, language, content)` triples in path
//! order, followed by the manifests. Input order does not change the digest,
//! so an external cache can key reports on it.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::types::Language;

use super::AnalysisInput;
use super::scan::node_path;

pub fn fingerprint(input: &AnalysisInput) -> String {
    // same file set ingestion keeps: empty paths dropped, first duplicate wins
    let mut seen: HashSet<String> = HashSet::new();
    let mut files: Vec<(String, &'static str, &[u8])> = Vec::with_capacity(input.files.len());
    for f in &input.files {
        let Some((path, _)) = node_path(&f.path) else {
            continue;
        };
        if !seen.insert(path.clone()) {
            continue;
        }
        let language = Language::detect(f.language.as_deref(), &path).as_str();
        files.push((path, language, f.content.as_bytes()));
    }
    files.sort();

    let mut manifests: Vec<String> = input
        .manifests
        .iter()
        .map(|m| serde_json::to_string(m).unwrap_or_default())
        .collect();
    manifests.sort();

    let mut hasher = Sha256::new();
    for (path, language, bytes) in &files {
        hasher.update(path.as_bytes());
        hasher.update([0]);
        hasher.update(language.as_bytes());
        hasher.update([0]);
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.update(b"manifests");
    for manifest in &manifests {
        hasher.update((manifest.len() as u64).to_le_bytes());
        hasher.update(manifest.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::manifests::ManifestInput;
    use crate::types::SourceInput;

    fn input(files: Vec<SourceInput>) -> AnalysisInput {
        AnalysisInput {
            files,
            manifests: Vec::new(),
        }
    }

    #[test]
    fn order_and_path_spelling_do_not_matter() {
        let a = input(vec![
            SourceInput::text("src/a.ts", "import './b'"),
            SourceInput::text("src/b.ts", ""),
        ]);
        let b = input(vec![
            SourceInput::text("./src/b.ts", ""),
            SourceInput::text("src\\a.ts", "import './b'"),
        ]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);
    }

    #[test]
    fn content_and_manifests_change_the_digest() {
        let base = input(vec![SourceInput::text("a.js", "x")]);
        let edited = input(vec![SourceInput::text("a.js", "y")]);
        assert_ne!(fingerprint(&base), fingerprint(&edited));

        let mut with_manifest = input(vec![SourceInput::text("a.js", "x")]);
        with_manifest
            .manifests
            .push(ManifestInput::file("go.mod", "module x\n"));
        assert_ne!(fingerprint(&base), fingerprint(&with_manifest));
    }

    #[test]
    fn follows_ingested_file_set() {
        let base = input(vec![SourceInput::text("a.js", "x")]);
        let with_empty = input(vec![
            SourceInput::text("a.js", "x"),
            SourceInput::text("", "ignored"),
        ]);
        let with_duplicate = input(vec![
            SourceInput::text("a.js", "x"),
            SourceInput::text("./a.js", "shadowed"),
        ]);
        let with_escaping = input(vec![
            SourceInput::text("a.js", "x"),
            SourceInput::text("../b.js", "y"),
        ]);
        assert_eq!(fingerprint(&base), fingerprint(&with_empty));
        assert_eq!(fingerprint(&base), fingerprint(&with_duplicate));
        assert_ne!(fingerprint(&base), fingerprint(&with_escaping));
    }
}
