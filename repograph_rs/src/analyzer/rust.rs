//! Rust extraction.
//!
//! `mod x;` declarations are the file edges of a crate; `use crate::..` paths
//! are resolved by walking the module path from the crate's `src/` root.
//! `self::` and `super::` paths are skipped: they usually name items of the
//! same file or its parent, not a separate dependency.

use crate::types::{ExportSymbol, ImportCategory, Language, SourceFile};

use super::extract::{ExtractContext, Extraction, ImportExtractor, LineIndex, RawImport};
use super::regexes::{
    regex_rust_extern_crate, regex_rust_mod_decl, regex_rust_pub_item, regex_rust_use,
};

/// Files whose child modules live next to them rather than in a subdirectory.
const MODULE_ROOT_STEMS: &[&str] = &["mod", "lib", "main"];

pub struct RustExtractor;

impl ImportExtractor for RustExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Rust]
    }

    fn extract(&self, content: &str, ctx: &ExtractContext<'_>) -> Extraction {
        let lines = LineIndex::new(content);
        let mut imports: Vec<(usize, RawImport)> = Vec::new();

        for caps in regex_rust_mod_decl().captures_iter(content) {
            if let Some(name) = caps.get(1) {
                imports.push((
                    name.start(),
                    RawImport::new(name.as_str(), lines.line_of(name.start()), ImportCategory::Relative),
                ));
            }
        }

        for caps in regex_rust_use().captures_iter(content) {
            let Some(tree) = caps.get(1) else { continue };
            let path: String = tree.as_str().split_whitespace().collect();
            let path = path.trim_start_matches("::");
            let head = path.split("::").next().unwrap_or(path);
            let category = match head {
                "self" | "super" | "Self" => continue,
                "crate" => ImportCategory::Absolute,
                _ if head.starts_with('{') => continue,
                _ if ctx.builtins.is_builtin(Language::Rust, path) => ImportCategory::Builtin,
                _ => ImportCategory::External,
            };
            imports.push((
                tree.start(),
                RawImport::new(path, lines.line_of(tree.start()), category),
            ));
        }

        for caps in regex_rust_extern_crate().captures_iter(content) {
            let Some(name) = caps.get(1) else { continue };
            if name.as_str() == "self" {
                continue;
            }
            let category = if ctx.builtins.is_builtin(Language::Rust, name.as_str()) {
                ImportCategory::Builtin
            } else {
                ImportCategory::External
            };
            imports.push((
                name.start(),
                RawImport::new(name.as_str(), lines.line_of(name.start()), category),
            ));
        }

        imports.sort_by_key(|(offset, _)| *offset);

        let exports = regex_rust_pub_item()
            .captures_iter(content)
            .filter_map(|caps| {
                let kind = caps.get(1)?;
                let name = caps.get(2)?;
                Some(ExportSymbol::new(
                    name.as_str(),
                    kind.as_str(),
                    lines.line_of(name.start()),
                ))
            })
            .collect();

        Extraction {
            imports: imports.into_iter().map(|(_, import)| import).collect(),
            exports,
        }
    }

    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => {
                let parent = module_dir(file);
                if parent.is_empty() {
                    vec![import.specifier.clone()]
                } else {
                    vec![format!("{parent}/{}", import.specifier)]
                }
            }
            ImportCategory::Absolute => crate_path_candidates(&import.specifier, &file.path),
            // 2018-edition paths may name a sibling `mod` before an extern crate
            ImportCategory::External => module_path_bases(&module_dir(file), &import.specifier),
            ImportCategory::Builtin => Vec::new(),
        }
    }

    fn package_name(&self, specifier: &str) -> String {
        specifier
            .split("::")
            .next()
            .unwrap_or(specifier)
            .to_string()
    }
}

/// Directory holding the child modules of `file`.
fn module_dir(file: &SourceFile) -> String {
    let stem = file_stem(&file.path);
    let dir = file.dir();
    if MODULE_ROOT_STEMS.contains(&stem) {
        dir.to_string()
    } else if dir.is_empty() {
        stem.to_string()
    } else {
        format!("{dir}/{stem}")
    }
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// `crate::a::b::C` -> `src/a/b/C`, `src/a/b`, `src/a`, then the crate root
/// files. The crate root is the closest `src` directory above the importer.
fn crate_path_candidates(path: &str, importer: &str) -> Vec<String> {
    let src_root = match importer.rfind("src/") {
        Some(idx) if idx == 0 || importer[..idx].ends_with('/') => &importer[..idx + 3],
        _ => "src",
    };
    let rest = path.split_once("::").map(|(_, rest)| rest).unwrap_or("");
    let mut bases = module_path_bases(src_root, rest);
    bases.push(format!("{src_root}/lib"));
    bases.push(format!("{src_root}/main"));
    bases
}

/// `a::b::C` under `root` -> `root/a/b/C`, `root/a/b`, `root/a`.
fn module_path_bases(root: &str, path: &str) -> Vec<String> {
    let segments: Vec<&str> = path
        .split("::")
        .take_while(|s| !s.is_empty() && !s.starts_with('{') && *s != "*")
        .collect();
    (1..=segments.len())
        .rev()
        .map(|n| {
            let tail = segments[..n].join("/");
            if root.is_empty() {
                tail
            } else {
                format!("{root}/{tail}")
            }
        })
        .collect()
}
