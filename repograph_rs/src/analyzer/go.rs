//! Go extraction with line-oriented heuristics (no parser).

use crate::types::{ExportSymbol, FileId, ImportCategory, Language, SourceFile};

use super::extract::{ExtractContext, Extraction, ImportExtractor, RawImport, classify_path_like};
use super::resolvers::{PathIndex, join_relative};

pub struct GoExtractor;

impl ImportExtractor for GoExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Go]
    }

    fn extract(&self, content: &str, ctx: &ExtractContext<'_>) -> Extraction {
        let imports = parse_imports(content)
            .into_iter()
            .map(|(path, line)| {
                let category = classify_path_like(&path, Language::Go, ctx.builtins);
                RawImport::new(path, line, category)
            })
            .collect();

        Extraction {
            imports,
            exports: parse_exports(content),
        }
    }

    /// Module-qualified paths are probed as package directories: the import
    /// path with leading segments dropped (`example.com/app/internal/db` ->
    /// `app/internal/db` -> `internal/db`), under each enclosing directory of
    /// the importer so nested modules resolve too.
    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => join_relative(file.dir(), &import.specifier)
                .into_iter()
                .collect(),
            ImportCategory::External => module_candidates(&import.specifier, file.dir()),
            ImportCategory::Absolute | ImportCategory::Builtin => Vec::new(),
        }
    }

    /// A Go package is a directory; its first non-test source file stands
    /// for it in the file graph.
    fn resolve(&self, bases: &[String], index: &PathIndex) -> Option<FileId> {
        bases
            .iter()
            .find_map(|dir| index.first_in_dir(dir, is_package_source))
    }

    /// Module paths keep `host/owner/repo`, the unit `go.mod` requires.
    fn package_name(&self, specifier: &str) -> String {
        let parts: Vec<&str> = specifier.split('/').collect();
        let keep = if parts.first().is_some_and(|host| host.contains('.')) {
            parts.len().min(3)
        } else {
            1
        };
        parts[..keep].join("/")
    }
}

fn is_package_source(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}

fn module_candidates(specifier: &str, importer_dir: &str) -> Vec<String> {
    let segments: Vec<&str> = specifier.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Vec::new();
    }
    // a lone trailing segment ("db") matches too much; keep two unless the
    // path had only one
    let min_len = segments.len().min(2);
    let mut ancestors = vec![importer_dir];
    let mut dir = importer_dir;
    while let Some((parent, _)) = dir.rsplit_once('/') {
        ancestors.push(parent);
        dir = parent;
    }
    if !importer_dir.is_empty() {
        ancestors.push("");
    }

    let mut bases = Vec::new();
    for start in 0..=segments.len() - min_len {
        let suffix = segments[start..].join("/");
        for ancestor in &ancestors {
            let base = if ancestor.is_empty() {
                suffix.clone()
            } else {
                format!("{ancestor}/{suffix}")
            };
            if !bases.contains(&base) {
                bases.push(base);
            }
        }
    }
    bases
}

fn parse_imports(content: &str) -> Vec<(String, usize)> {
    let mut imports: Vec<(String, usize)> = Vec::new();
    let mut in_block = false;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with("import (") || trimmed == "import(" {
            in_block = true;
            continue;
        }

        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
                continue;
            }
            if let Some(path) = extract_import_path(trimmed) {
                push_import(&mut imports, path, idx + 1);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("import ")
            && let Some(path) = extract_import_path(rest.trim())
        {
            push_import(&mut imports, path, idx + 1);
        }
    }

    imports
}

fn extract_import_path(segment: &str) -> Option<String> {
    if segment.starts_with("//") {
        return None;
    }
    // Accept both "pkg/path" and `pkg/path`
    let quote_start = segment.find(&['"', '`'][..])?;
    let quote = segment.as_bytes()[quote_start];
    let tail = &segment[quote_start + 1..];
    let path_end = tail.find(quote as char)?;
    let path = tail[..path_end].trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn push_import(imports: &mut Vec<(String, usize)>, path: String, line: usize) {
    if imports.iter().any(|(existing, _)| *existing == path) {
        return;
    }
    imports.push((path, line));
}

fn parse_exports(content: &str) -> Vec<ExportSymbol> {
    let mut exports = Vec::new();
    let mut block: Option<&'static str> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_start();

        if let Some(kind) = block {
            if trimmed.starts_with(')') {
                block = None;
            } else {
                for name in parse_const_var_names(trimmed) {
                    push_exported(&mut exports, name, kind, line_no);
                }
            }
            continue;
        }

        if let Some(name) = parse_func_name(trimmed) {
            push_exported(&mut exports, name, "func", line_no);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("type ") {
            if let Some(name) = rest.split_whitespace().next() {
                push_exported(&mut exports, name, "type", line_no);
            }
            continue;
        }

        for kind in ["const", "var"] {
            if let Some(rest) = trimmed.strip_prefix(kind) {
                let rest = rest.trim_start();
                if rest.starts_with('(') {
                    block = Some(kind);
                } else if rest.len() < trimmed.len() - kind.len() {
                    for name in parse_const_var_names(rest) {
                        push_exported(&mut exports, name, kind, line_no);
                    }
                }
            }
        }
    }

    exports
}

fn push_exported(exports: &mut Vec<ExportSymbol>, name: &str, kind: &str, line: usize) {
    if is_exported(name) {
        exports.push(ExportSymbol::new(name, kind, line));
    }
}

fn parse_func_name(line: &str) -> Option<&str> {
    let after = line.strip_prefix("func ")?.trim_start();
    let without_receiver = if after.starts_with('(') {
        after.split_once(')')?.1.trim_start()
    } else {
        after
    };
    without_receiver
        .split(|c: char| c.is_whitespace() || c == '(' || c == '[')
        .find(|s| !s.is_empty())
}

fn parse_const_var_names(segment: &str) -> Vec<&str> {
    // "Foo = 1" or "Foo, Bar int = ..."
    let lhs = segment.split('=').next().unwrap_or(segment);
    lhs.split(',')
        .filter_map(|part| part.split_whitespace().next())
        .collect()
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::builtins::Builtins;

    #[test]
    fn parses_go_imports_and_exports() {
        let src = r#"
package main

import (
    "fmt"
    util "example.com/util"
    _ "net/http/pprof"
    // "commented/out"
)

import "github.com/spf13/cobra/cmd"

const (
    Version = "1.0"
    localConst = "x"
)

var Exported, hidden = 1, 0

type Server struct{}
func (s *Server) Serve() {}
func helper() {}
func Public() {}
"#;
        let builtins = Builtins::default();
        let ctx = ExtractContext {
            path: "app/main.go",
            builtins: &builtins,
        };
        let extraction = GoExtractor.extract(src, &ctx);
        let imports: Vec<(&str, ImportCategory, usize)> = extraction
            .imports
            .iter()
            .map(|i| (i.specifier.as_str(), i.category, i.line))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("fmt", ImportCategory::Builtin, 5),
                ("example.com/util", ImportCategory::External, 6),
                ("net/http/pprof", ImportCategory::Builtin, 7),
                ("github.com/spf13/cobra/cmd", ImportCategory::External, 11),
            ]
        );

        let names: Vec<&str> = extraction.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Version", "Exported", "Server", "Serve", "Public"]);
    }

    #[test]
    fn module_paths_probe_suffixes_under_ancestors() {
        assert_eq!(
            module_candidates("example.com/app/internal/db", "svc/cmd"),
            vec![
                "svc/cmd/example.com/app/internal/db",
                "svc/example.com/app/internal/db",
                "example.com/app/internal/db",
                "svc/cmd/app/internal/db",
                "svc/app/internal/db",
                "app/internal/db",
                "svc/cmd/internal/db",
                "svc/internal/db",
                "internal/db",
            ]
        );
        assert_eq!(module_candidates("myapp", ""), vec!["myapp"]);
    }

    #[test]
    fn module_package_names() {
        assert_eq!(GoExtractor.package_name("github.com/spf13/cobra/cmd"), "github.com/spf13/cobra");
        assert_eq!(GoExtractor.package_name("gopkg.in/yaml.v3"), "gopkg.in/yaml.v3");
        assert_eq!(GoExtractor.package_name("fmt"), "fmt");
    }
}
