//! Declared dependencies from package manifests.
//!
//! Supports already-parsed npm-style objects plus raw `package.json`,
//! `Cargo.toml`, `requirements*.txt`, `pyproject.toml` and `go.mod` files.
//! Parsing is strict about shape: a manifest whose dependency tables have the
//! wrong type is rejected as a whole, and the caller skips it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use toml::{Table, Value as TomlValue};

use crate::error::ManifestError;

/// Name -> version requirement. Versions are informational.
pub type DependencyMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependencySet {
    /// Where the set came from (`package.json`, `crates/core/Cargo.toml`...).
    pub source: String,
    /// The project's own name; importing it is never "missing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
}

impl ManifestDependencySet {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Accept a parsed npm-style object:
    /// `{name?, dependencies?, devDependencies?, peerDependencies?, optionalDependencies?}`.
    pub fn from_json_value(source: &str, value: &JsonValue) -> Result<Self, ManifestError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ManifestError::malformed("manifest", "expected a JSON object"))?;

        let mut set = Self::new(source);
        set.name = obj.get("name").and_then(|v| v.as_str()).map(str::to_string);
        for field in ["dependencies", "peerDependencies", "optionalDependencies"] {
            collect_json_map(obj.get(field), field, &mut set.dependencies)?;
        }
        collect_json_map(obj.get("devDependencies"), "devDependencies", &mut set.dev_dependencies)?;
        Ok(set)
    }

    /// Parse a raw manifest file, picking the format from its file name.
    pub fn parse(path: &str, content: &str) -> Result<Self, ManifestError> {
        match ManifestKind::from_path(path) {
            Some(ManifestKind::PackageJson) => {
                let value: JsonValue = serde_json::from_str(content)?;
                Self::from_json_value(path, &value)
            }
            Some(ManifestKind::CargoToml) => parse_cargo_toml(path, content),
            Some(ManifestKind::Requirements) => Ok(parse_requirements(path, content)),
            Some(ManifestKind::PyProject) => parse_pyproject(path, content),
            Some(ManifestKind::GoMod) => Ok(parse_go_mod(path, content)),
            None => Err(ManifestError::Unsupported(path.to_string())),
        }
    }

    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Manifest entry of the input contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestInput {
    /// Raw manifest file.
    File { path: String, content: String },
    /// Already-parsed npm-style object.
    Parsed(JsonValue),
}

impl ManifestInput {
    pub fn file(path: impl Into<String>, content: impl Into<String>) -> Self {
        ManifestInput::File {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Label used in diagnostics and as the set's `source`.
    pub fn label(&self, index: usize) -> String {
        match self {
            ManifestInput::File { path, .. } => path.clone(),
            ManifestInput::Parsed(_) => format!("manifest[{index}]"),
        }
    }

    pub fn to_dependency_set(&self, index: usize) -> Result<ManifestDependencySet, ManifestError> {
        match self {
            ManifestInput::File { path, content } => ManifestDependencySet::parse(path, content),
            ManifestInput::Parsed(value) => {
                ManifestDependencySet::from_json_value(&self.label(index), value)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    PackageJson,
    CargoToml,
    Requirements,
    PyProject,
    GoMod,
}

impl ManifestKind {
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.replace('\\', "/");
        let name = name.rsplit('/').next().unwrap_or_default();
        match name {
            "package.json" => Some(ManifestKind::PackageJson),
            "Cargo.toml" => Some(ManifestKind::CargoToml),
            "pyproject.toml" => Some(ManifestKind::PyProject),
            "go.mod" => Some(ManifestKind::GoMod),
            _ if name.starts_with("requirements") && name.ends_with(".txt") => {
                Some(ManifestKind::Requirements)
            }
            _ => None,
        }
    }
}

pub fn is_manifest_path(path: &str) -> bool {
    ManifestKind::from_path(path).is_some()
}

fn collect_json_map(
    value: Option<&JsonValue>,
    field: &str,
    out: &mut DependencyMap,
) -> Result<(), ManifestError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let map = value
        .as_object()
        .ok_or_else(|| ManifestError::malformed(field, "expected an object of name -> version"))?;
    for (name, version) in map {
        let version = version
            .as_str()
            .ok_or_else(|| ManifestError::malformed(field, format!("version of `{name}` is not a string")))?;
        out.insert(name.clone(), version.to_string());
    }
    Ok(())
}

fn parse_cargo_toml(path: &str, content: &str) -> Result<ManifestDependencySet, ManifestError> {
    let table: Table = toml::from_str(content)?;
    let mut set = ManifestDependencySet::new(path);

    set.name = table
        .get("package")
        .and_then(|v| v.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    collect_cargo_deps(&table, "dependencies", &mut set.dependencies)?;
    collect_cargo_deps(&table, "dev-dependencies", &mut set.dev_dependencies)?;
    collect_cargo_deps(&table, "build-dependencies", &mut set.dev_dependencies)?;

    if let Some(workspace) = table.get("workspace").and_then(|v| v.as_table()) {
        collect_cargo_deps(workspace, "dependencies", &mut set.dependencies)?;
    }

    // [target.'cfg(unix)'.dependencies]
    if let Some(targets) = table.get("target").and_then(|v| v.as_table()) {
        for target in targets.values().filter_map(|v| v.as_table()) {
            collect_cargo_deps(target, "dependencies", &mut set.dependencies)?;
            collect_cargo_deps(target, "dev-dependencies", &mut set.dev_dependencies)?;
            collect_cargo_deps(target, "build-dependencies", &mut set.dev_dependencies)?;
        }
    }

    Ok(set)
}

fn collect_cargo_deps(table: &Table, key: &str, out: &mut DependencyMap) -> Result<(), ManifestError> {
    let Some(value) = table.get(key) else {
        return Ok(());
    };
    let deps = value
        .as_table()
        .ok_or_else(|| ManifestError::malformed(key, "expected a table"))?;
    for (name, spec) in deps {
        let version = match spec {
            TomlValue::String(v) => v.clone(),
            TomlValue::Table(t) => t
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("*")
                .to_string(),
            _ => {
                return Err(ManifestError::malformed(
                    key,
                    format!("`{name}` must be a string or a table"),
                ));
            }
        };
        out.insert(name.clone(), version);
    }
    Ok(())
}

/// `requests[socks]>=2.0 ; python_version > "3"` -> (`requests`, `>=2.0`).
fn split_requirement(line: &str) -> Option<(String, String)> {
    let line = line.split(';').next().unwrap_or(line).trim();
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(line.len());
    let name = &line[..end];
    if name.is_empty() {
        return None;
    }
    let rest = line[end..].trim_start();
    let rest = match rest.strip_prefix('[') {
        Some(extras) => extras.split_once(']').map(|(_, r)| r).unwrap_or_default(),
        None => rest,
    };
    let version = rest.trim();
    Some((
        name.to_string(),
        if version.is_empty() { "*" } else { version }.to_string(),
    ))
}

fn parse_requirements(path: &str, content: &str) -> ManifestDependencySet {
    let mut set = ManifestDependencySet::new(path);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let is_dev = file_name.contains("dev") || file_name.contains("test");

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        // options, includes, editable installs, URLs
        if line.is_empty() || line.starts_with('-') || line.contains("://") {
            continue;
        }
        if let Some((name, version)) = split_requirement(line) {
            if is_dev {
                set.dev_dependencies.insert(name, version);
            } else {
                set.dependencies.insert(name, version);
            }
        }
    }
    set
}

fn parse_pyproject(path: &str, content: &str) -> Result<ManifestDependencySet, ManifestError> {
    let table: Table = toml::from_str(content)?;
    let mut set = ManifestDependencySet::new(path);

    if let Some(project) = table.get("project").and_then(|v| v.as_table()) {
        set.name = project.get("name").and_then(|v| v.as_str()).map(str::to_string);
        collect_pep508_array(project.get("dependencies"), "project.dependencies", &mut set.dependencies)?;
        if let Some(optional) = project.get("optional-dependencies") {
            let groups = optional.as_table().ok_or_else(|| {
                ManifestError::malformed("project.optional-dependencies", "expected a table")
            })?;
            for group in groups.values() {
                collect_pep508_array(Some(group), "project.optional-dependencies", &mut set.dev_dependencies)?;
            }
        }
    }

    // PEP 735
    if let Some(groups) = table.get("dependency-groups").and_then(|v| v.as_table()) {
        for group in groups.values() {
            if let Some(items) = group.as_array() {
                // include-group entries are tables; only requirement strings count
                for item in items.iter().filter_map(|v| v.as_str()) {
                    if let Some((name, version)) = split_requirement(item) {
                        set.dev_dependencies.insert(name, version);
                    }
                }
            }
        }
    }

    if let Some(poetry) = table
        .get("tool")
        .and_then(|v| v.get("poetry"))
        .and_then(|v| v.as_table())
    {
        if set.name.is_none() {
            set.name = poetry.get("name").and_then(|v| v.as_str()).map(str::to_string);
        }
        collect_poetry_deps(poetry, "dependencies", &mut set.dependencies)?;
        collect_poetry_deps(poetry, "dev-dependencies", &mut set.dev_dependencies)?;
        if let Some(groups) = poetry.get("group").and_then(|v| v.as_table()) {
            for group in groups.values().filter_map(|v| v.as_table()) {
                collect_poetry_deps(group, "dependencies", &mut set.dev_dependencies)?;
            }
        }
    }

    Ok(set)
}

fn collect_pep508_array(
    value: Option<&TomlValue>,
    field: &str,
    out: &mut DependencyMap,
) -> Result<(), ManifestError> {
    let Some(value) = value else {
        return Ok(());
    };
    let items = value
        .as_array()
        .ok_or_else(|| ManifestError::malformed(field, "expected an array of requirements"))?;
    for item in items {
        let requirement = item
            .as_str()
            .ok_or_else(|| ManifestError::malformed(field, "requirement is not a string"))?;
        if let Some((name, version)) = split_requirement(requirement) {
            out.insert(name, version);
        }
    }
    Ok(())
}

fn collect_poetry_deps(table: &Table, key: &str, out: &mut DependencyMap) -> Result<(), ManifestError> {
    let Some(value) = table.get(key) else {
        return Ok(());
    };
    let deps = value
        .as_table()
        .ok_or_else(|| ManifestError::malformed(key, "expected a table"))?;
    for (name, spec) in deps {
        if name == "python" {
            continue;
        }
        let version = match spec {
            TomlValue::String(v) => v.clone(),
            TomlValue::Table(t) => t
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("*")
                .to_string(),
            _ => "*".to_string(),
        };
        out.insert(name.clone(), version);
    }
    Ok(())
}

fn parse_go_mod(path: &str, content: &str) -> ManifestDependencySet {
    let mut set = ManifestDependencySet::new(path);
    let mut in_require = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(module) = trimmed.strip_prefix("module ") {
            set.name = Some(module.trim().trim_matches('"').to_string());
            continue;
        }
        if trimmed.starts_with("require (") || trimmed == "require(" {
            in_require = true;
            continue;
        }
        let entry = if in_require {
            if trimmed.starts_with(')') {
                in_require = false;
                continue;
            }
            trimmed
        } else if let Some(rest) = trimmed.strip_prefix("require ") {
            rest.trim()
        } else {
            continue;
        };

        // transitive requirements are not the module's own choice
        if entry.contains("// indirect") {
            continue;
        }
        let mut parts = entry.split_whitespace();
        if let (Some(module), Some(version)) = (parts.next(), parts.next())
            && !module.starts_with("//")
        {
            set.dependencies.insert(module.to_string(), version.to_string());
        }
    }
    set
}
