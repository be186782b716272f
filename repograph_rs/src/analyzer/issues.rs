//! Cross-checks declared dependencies against what the code imports.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{EdgeKind, FileRecord, Severity};

use super::cycles::Cycle;
use super::manifests::ManifestDependencySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Declared in a manifest, never imported.
    Unused,
    /// Imported, declared nowhere.
    Missing,
    Circular,
    /// Relative/absolute import with no matching file. Informational.
    Unresolved,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Unused => "unused",
            IssueKind::Missing => "missing",
            IssueKind::Circular => "circular",
            IssueKind::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub target: String,
    pub severity: Severity,
    /// Importers, declaring manifests or cycle members, depending on kind.
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Comparison key: case-insensitive, `-` and `_` are the same.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

/// An external import (by its specifier and package) satisfies a declared,
/// normalized name when either equals it or the specifier is a sub-path of it.
fn satisfies(declared: &str, specifier: &str, package: &str) -> bool {
    let specifier = normalize_name(specifier);
    normalize_name(package) == declared
        || specifier == declared
        || specifier
            .strip_prefix(declared)
            .is_some_and(|rest| rest.starts_with('/'))
}

struct ExternalUse<'a> {
    specifier: &'a str,
    package: &'a str,
    file: &'a str,
}

fn external_uses(records: &[FileRecord]) -> Vec<ExternalUse<'_>> {
    records
        .iter()
        .flat_map(|record| {
            record.edges_of(EdgeKind::External).filter_map(|edge| {
                Some(ExternalUse {
                    specifier: &edge.specifier,
                    package: edge.package()?,
                    file: &record.path,
                })
            })
        })
        .collect()
}

struct Declared {
    display: String,
    production: bool,
    sources: BTreeSet<String>,
}

/// Declared names across all manifests, deduplicated by normalized name.
fn declared_names(manifests: &[ManifestDependencySet]) -> BTreeMap<String, Declared> {
    let mut declared: BTreeMap<String, Declared> = BTreeMap::new();
    for manifest in manifests {
        let tables = [(&manifest.dependencies, true), (&manifest.dev_dependencies, false)];
        for (table, production) in tables {
            for name in table.keys() {
                let entry = declared.entry(normalize_name(name)).or_insert_with(|| Declared {
                    display: name.clone(),
                    production,
                    sources: BTreeSet::new(),
                });
                entry.production |= production;
                entry.sources.insert(manifest.source.clone());
            }
        }
    }
    declared
}

pub fn unused_dependencies(
    records: &[FileRecord],
    manifests: &[ManifestDependencySet],
    ignore_unused: &[String],
) -> Vec<Issue> {
    let uses = external_uses(records);
    let ignored: HashSet<String> = ignore_unused.iter().map(|n| normalize_name(n)).collect();

    declared_names(manifests)
        .into_iter()
        .filter(|(key, _)| !ignored.contains(key))
        .filter(|(key, _)| !uses.iter().any(|u| satisfies(key, u.specifier, u.package)))
        .map(|(_, declared)| Issue {
            kind: IssueKind::Unused,
            target: declared.display,
            severity: if declared.production {
                Severity::Medium
            } else {
                Severity::Low
            },
            files: declared.sources.into_iter().collect(),
            detail: Some(
                if declared.production {
                    "declared as a dependency but never imported"
                } else {
                    "declared as a dev dependency but never imported"
                }
                .to_string(),
            ),
        })
        .collect()
}

pub fn missing_dependencies(records: &[FileRecord], manifests: &[ManifestDependencySet]) -> Vec<Issue> {
    let declared: Vec<String> = manifests
        .iter()
        .flat_map(|m| m.all_names().chain(m.name.as_deref()))
        .map(normalize_name)
        .collect();

    let mut missing: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for u in external_uses(records) {
        if declared.iter().any(|d| satisfies(d, u.specifier, u.package)) {
            continue;
        }
        missing.entry(u.package).or_default().insert(u.file);
    }

    missing
        .into_iter()
        .map(|(package, files)| Issue {
            kind: IssueKind::Missing,
            target: package.to_string(),
            severity: Severity::High,
            files: files.into_iter().map(str::to_string).collect(),
            detail: Some("imported but not declared in any manifest".to_string()),
        })
        .collect()
}

pub fn circular_issues(cycles: &[Cycle]) -> Vec<Issue> {
    cycles
        .iter()
        .map(|cycle| Issue {
            kind: IssueKind::Circular,
            target: cycle.files.join(" -> "),
            severity: cycle.severity,
            files: cycle.files.clone(),
            detail: Some(format!("import cycle of length {}", cycle.length)),
        })
        .collect()
}

pub fn unresolved_imports(records: &[FileRecord]) -> Vec<Issue> {
    records
        .iter()
        .flat_map(|record| {
            record.edges_of(EdgeKind::Missing).map(|edge| Issue {
                kind: IssueKind::Unresolved,
                target: edge.specifier.clone(),
                severity: Severity::Low,
                files: vec![record.path.clone()],
                detail: Some(format!("line {}", edge.line)),
            })
        })
        .collect()
}

/// Manifest and resolution issues: missing, unused, then unresolved.
/// Circular issues come from [`circular_issues`] once cycles are known.
pub fn dependency_issues(
    records: &[FileRecord],
    manifests: &[ManifestDependencySet],
    ignore_unused: &[String],
) -> Vec<Issue> {
    let mut issues = missing_dependencies(records, manifests);
    issues.extend(unused_dependencies(records, manifests, ignore_unused));
    issues.extend(unresolved_imports(records));
    issues
}

pub fn count_of(issues: &[Issue], kind: IssueKind) -> usize {
    issues.iter().filter(|i| i.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyEdge, EdgeTarget, FileStatus, Language};

    fn record(path: &str, externals: &[(&str, &str)]) -> FileRecord {
        FileRecord {
            id: 0,
            path: path.to_string(),
            language: Language::from_path(path),
            size: 0,
            loc: 0,
            status: FileStatus::Parsed,
            imports: Vec::new(),
            exports: Vec::new(),
            dependencies: externals
                .iter()
                .map(|(spec, package)| DependencyEdge {
                    source: 0,
                    specifier: spec.to_string(),
                    line: 1,
                    target: EdgeTarget::External {
                        package: package.to_string(),
                    },
                })
                .collect(),
        }
    }

    fn manifest(source: &str, deps: &[&str], dev: &[&str]) -> ManifestDependencySet {
        let mut set = ManifestDependencySet::new(source);
        set.dependencies = deps.iter().map(|d| (d.to_string(), "*".to_string())).collect();
        set.dev_dependencies = dev.iter().map(|d| (d.to_string(), "*".to_string())).collect();
        set
    }

    #[test]
    fn declared_but_unimported_is_unused() {
        let issues = unused_dependencies(
            &[record("a.js", &[])],
            &[manifest("package.json", &["left-pad"], &[])],
            &[],
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target, "left-pad");
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].files, vec!["package.json"]);
    }

    #[test]
    fn duplicate_declarations_report_once() {
        let issues = unused_dependencies(
            &[],
            &[
                manifest("package.json", &["lodash"], &[]),
                manifest("web/package.json", &[], &["lodash"]),
            ],
            &[],
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].files, vec!["package.json", "web/package.json"]);
    }

    #[test]
    fn subpath_and_scoped_imports_count_as_use() {
        let records = [record(
            "a.ts",
            &[("lodash/fp", "lodash"), ("@babel/core/lib/x", "@babel/core")],
        )];
        let manifests = [manifest("package.json", &["lodash", "@babel/core"], &["vitest"])];
        let issues = unused_dependencies(&records, &manifests, &[]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target, "vitest");
        assert_eq!(issues[0].severity, Severity::Low);
    }

    #[test]
    fn ignore_list_suppresses_unused() {
        let issues = unused_dependencies(
            &[],
            &[manifest("package.json", &["typescript"], &[])],
            &["TypeScript".to_string()],
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn undeclared_import_is_missing_once_per_package() {
        let records = [
            record("a.js", &[("left-pad", "left-pad")]),
            record("b.js", &[("left-pad/x", "left-pad")]),
        ];
        let issues = missing_dependencies(&records, &[]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target, "left-pad");
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].files, vec!["a.js", "b.js"]);
    }

    #[test]
    fn names_compare_loosely_and_own_name_is_declared() {
        let records = [record(
            "src/lib.rs",
            &[("serde_json::Value", "serde_json"), ("mycrate::x", "mycrate")],
        )];
        let mut cargo = manifest("Cargo.toml", &["serde-json"], &[]);
        cargo.name = Some("mycrate".to_string());
        assert!(missing_dependencies(&records, &[cargo.clone()]).is_empty());
        assert!(unused_dependencies(&records, &[cargo], &[]).is_empty());
    }

    #[test]
    fn unresolved_relative_imports_are_listed() {
        let mut r = record("src/a.js", &[]);
        r.dependencies.push(DependencyEdge {
            source: 0,
            specifier: "./gone".to_string(),
            line: 7,
            target: EdgeTarget::Missing,
        });
        let issues = unresolved_imports(&[r]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Unresolved);
        assert_eq!(issues[0].detail.as_deref(), Some("line 7"));
    }
}
