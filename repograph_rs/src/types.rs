//! Common types shared by every analysis stage.
//!
//! Files are addressed by [`FileId`], an index into the ingested file list, so
//! graph structures never hold references to each other.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a file inside one analysis run.
pub type FileId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    Css,
    C,
    Cpp,
    Unknown,
}

impl Language {
    /// Map a free-form language tag (or bare extension) to a language.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "mjs" | "cjs" | "vue" | "svelte" => Language::JavaScript,
            "typescript" | "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "python" | "py" | "pyi" => Language::Python,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "c" | "h" => Language::C,
            "cpp" | "c++" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self::from_tag(ext),
            _ => Language::Unknown,
        }
    }

    /// Resolve the language of an input record: an explicit, recognized tag
    /// wins, otherwise the extension decides.
    pub fn detect(tag: Option<&str>, path: &str) -> Self {
        match tag.map(Self::from_tag) {
            Some(lang) if lang != Language::Unknown => lang,
            _ => Self::from_path(path),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Css => "css",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw file payload as handed over by the retrieval layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Bytes(bytes) => bytes,
        }
    }
}

/// One `{path, language, content}` record of the input contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInput {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub content: FileContent,
}

impl SourceInput {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: None,
            content: FileContent::Text(content.into()),
        }
    }

    pub fn bytes(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            language: None,
            content: FileContent::Bytes(content),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// An ingested file. Immutable once built.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: String,
    pub language: Language,
    pub content: String,
    pub size: usize,
    pub loc: usize,
    /// Set when the payload could not be decoded; the file is still a node.
    pub unparsed: Option<String>,
}

impl SourceFile {
    /// Directory part of the path, without trailing slash ("" for root files).
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportCategory {
    Relative,
    Absolute,
    Builtin,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub file: FileId,
    pub specifier: String,
    pub line: usize,
    pub category: ImportCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSymbol {
    pub name: String,
    pub kind: String,
    pub line: usize,
}

impl ExportSymbol {
    pub fn new(name: impl Into<String>, kind: &str, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: kind.to_string(),
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Internal,
    External,
    Missing,
}

/// Where a dependency points. Internal targets are always existing nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgeTarget {
    Internal { target: FileId },
    External { package: String },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: FileId,
    pub specifier: String,
    pub line: usize,
    #[serde(flatten)]
    pub target: EdgeTarget,
}

impl DependencyEdge {
    pub fn kind(&self) -> EdgeKind {
        match self.target {
            EdgeTarget::Internal { .. } => EdgeKind::Internal,
            EdgeTarget::External { .. } => EdgeKind::External,
            EdgeTarget::Missing => EdgeKind::Missing,
        }
    }

    pub fn internal_target(&self) -> Option<FileId> {
        match self.target {
            EdgeTarget::Internal { target } => Some(target),
            _ => None,
        }
    }

    pub fn package(&self) -> Option<&str> {
        match &self.target {
            EdgeTarget::External { package } => Some(package),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    Parsed,
    /// No extractor for the language; zero imports by contract.
    Unsupported,
    Unparsed { reason: String },
}

/// Per-file outcome of extraction and resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub path: String,
    pub language: Language,
    pub size: usize,
    pub loc: usize,
    #[serde(flatten)]
    pub status: FileStatus,
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<ExportSymbol>,
    pub dependencies: Vec<DependencyEdge>,
}

impl FileRecord {
    pub fn new(file: &SourceFile) -> Self {
        Self {
            id: file.id,
            path: file.path.clone(),
            language: file.language,
            size: file.size,
            loc: file.loc,
            status: FileStatus::Parsed,
            imports: Vec::new(),
            exports: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Degrade to an unparsed record: no imports, no dependencies.
    pub fn unparsed(file: &SourceFile, reason: impl Into<String>) -> Self {
        let mut record = Self::new(file);
        record.status = FileStatus::Unparsed {
            reason: reason.into(),
        };
        record
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self.status, FileStatus::Unparsed { .. })
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &DependencyEdge> {
        self.dependencies.iter().filter(move |e| e.kind() == kind)
    }
}

/// Shared severity scale for cycles and issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded degradation (skipped manifest, unparsed file, duplicate path...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub subject: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}
