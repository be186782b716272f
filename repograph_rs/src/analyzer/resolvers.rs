//! Path resolution against the analyzed file set.
//!
//! Nothing here touches the filesystem: the set of paths is known up front,
//! so resolution is a pure lookup and safe to run from any worker.

use std::collections::{BTreeMap, HashMap};

use crate::types::{FileId, SourceFile};

/// Extensions tried, in order, when a specifier omits one.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "vue", "svelte", "py", "rs", "go", "css",
    "scss", "sass", "less", "c", "h", "cc", "cpp", "cxx", "hpp", "hh", "json",
];

/// File stems that stand for their directory.
pub const INDEX_STEMS: &[&str] = &["index", "__init__", "mod"];

/// ESM sources written in TypeScript import their siblings by emitted name.
const TS_SIBLINGS: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx"]),
    (".jsx", &[".tsx"]),
    (".mjs", &[".mts"]),
    (".cjs", &[".cts"]),
];

/// Normalize a path to the canonical `a/b/c` form: forward slashes, no `.`
/// segments, `..` collapsed, no leading or trailing slash. Returns `None` when
/// `..` climbs above the root.
pub fn normalize_path(raw: &str) -> Option<String> {
    let raw = raw.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Join a specifier onto the importing file's directory.
pub fn join_relative(dir: &str, specifier: &str) -> Option<String> {
    if dir.is_empty() {
        normalize_path(specifier)
    } else {
        normalize_path(&format!("{dir}/{specifier}"))
    }
}

/// Lookup table from normalized path to file id.
#[derive(Debug, Default)]
pub struct PathIndex {
    by_path: HashMap<String, FileId>,
    /// directory -> file name -> id, names in sorted order
    by_dir: HashMap<String, BTreeMap<String, FileId>>,
}

impl PathIndex {
    pub fn new(files: &[SourceFile]) -> Self {
        let mut by_dir: HashMap<String, BTreeMap<String, FileId>> = HashMap::new();
        for f in files {
            let (dir, name) = f.path.rsplit_once('/').unwrap_or(("", f.path.as_str()));
            by_dir
                .entry(dir.to_string())
                .or_default()
                .insert(name.to_string(), f.id);
        }
        Self {
            by_path: files.iter().map(|f| (f.path.clone(), f.id)).collect(),
            by_dir,
        }
    }

    pub fn get(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    /// First file directly inside `dir`, by name, that `accept` admits.
    pub fn first_in_dir(&self, dir: &str, accept: impl Fn(&str) -> bool) -> Option<FileId> {
        self.by_dir
            .get(dir)?
            .iter()
            .find(|(name, _)| accept(name))
            .map(|(_, id)| *id)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// First file matching any candidate base, trying each base as-is, with
    /// known extensions, then as a directory holding an index file.
    pub fn resolve(&self, bases: &[String]) -> Option<FileId> {
        bases.iter().find_map(|base| self.resolve_base(base))
    }

    fn resolve_base(&self, base: &str) -> Option<FileId> {
        if !base.is_empty()
            && let Some(id) = self.get(base)
        {
            return Some(id);
        }

        if !base.is_empty() {
            for ext in KNOWN_EXTENSIONS {
                if let Some(id) = self.get(&format!("{base}.{ext}")) {
                    return Some(id);
                }
            }
            for (emitted, sources) in TS_SIBLINGS {
                if let Some(stem) = base.strip_suffix(emitted) {
                    for source in *sources {
                        if let Some(id) = self.get(&format!("{stem}{source}")) {
                            return Some(id);
                        }
                    }
                }
            }
        }

        for stem in INDEX_STEMS {
            for ext in KNOWN_EXTENSIONS {
                let candidate = if base.is_empty() {
                    format!("{stem}.{ext}")
                } else {
                    format!("{base}/{stem}.{ext}")
                };
                if let Some(id) = self.get(&candidate) {
                    return Some(id);
                }
            }
        }
        None
    }
}
