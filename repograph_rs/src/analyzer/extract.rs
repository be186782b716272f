//! Pluggable per-language import/export extraction.
//!
//! Every strategy is a lightweight text scan, not a parser. It over-reports on
//! imports hidden in comments or strings and under-reports on syntax its
//! patterns do not know; that trade is what keeps a scan of an arbitrary
//! repository fast. Languages without a strategy fall through to
//! [`NoopExtractor`], which returns nothing.

use crate::types::{ExportSymbol, FileId, ImportCategory, Language, SourceFile};

use super::builtins::Builtins;
use super::resolvers::{PathIndex, join_relative};
use super::{clike, css, go, js, py, rust};

/// An import as seen in the text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    pub specifier: String,
    pub line: usize,
    pub category: ImportCategory,
}

impl RawImport {
    pub fn new(specifier: impl Into<String>, line: usize, category: ImportCategory) -> Self {
        Self {
            specifier: specifier.into(),
            line,
            category,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub imports: Vec<RawImport>,
    pub exports: Vec<ExportSymbol>,
}

pub struct ExtractContext<'a> {
    pub path: &'a str,
    pub builtins: &'a Builtins,
}

pub trait ImportExtractor: Send + Sync {
    fn languages(&self) -> &'static [Language];

    fn extract(&self, content: &str, ctx: &ExtractContext<'_>) -> Extraction;

    /// Root-relative base paths (no extension) an import may live at, in
    /// priority order. The resolver expands each with extensions and index
    /// files. `External` imports that yield candidates are probed too and
    /// become `Absolute` when one resolves.
    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => join_relative(file.dir(), &import.specifier)
                .into_iter()
                .collect(),
            ImportCategory::Absolute => vec![import.specifier.trim_start_matches('/').to_string()],
            ImportCategory::Builtin | ImportCategory::External => Vec::new(),
        }
    }

    /// Match candidate bases against the file set.
    fn resolve(&self, bases: &[String], index: &PathIndex) -> Option<FileId> {
        index.resolve(bases)
    }

    /// Package an external specifier belongs to.
    fn package_name(&self, specifier: &str) -> String {
        specifier.to_string()
    }
}

/// Strategy for languages nobody taught us.
pub struct NoopExtractor;

impl ImportExtractor for NoopExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Unknown]
    }

    fn extract(&self, _content: &str, _ctx: &ExtractContext<'_>) -> Extraction {
        Extraction::default()
    }
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ImportExtractor>>,
    fallback: NoopExtractor,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self {
            extractors: vec![
                Box::new(js::JsExtractor),
                Box::new(py::PythonExtractor),
                Box::new(rust::RustExtractor),
                Box::new(go::GoExtractor),
                Box::new(css::CssExtractor),
                Box::new(clike::CExtractor),
            ],
            fallback: NoopExtractor,
        }
    }
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
            fallback: NoopExtractor,
        }
    }

    /// Later registrations shadow earlier ones for the same language.
    pub fn register(&mut self, extractor: Box<dyn ImportExtractor>) {
        self.extractors.insert(0, extractor);
    }

    pub fn supports(&self, language: Language) -> bool {
        self.find(language).is_some()
    }

    pub fn for_language(&self, language: Language) -> &dyn ImportExtractor {
        match self.find(language) {
            Some(extractor) => extractor,
            None => &self.fallback,
        }
    }

    fn find(&self, language: Language) -> Option<&dyn ImportExtractor> {
        self.extractors
            .iter()
            .find(|e| e.languages().contains(&language))
            .map(|e| e.as_ref())
    }
}

/// Byte offset to 1-based line lookup.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(content.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Shared classification for path-like specifiers (JS family, CSS, Go).
pub(crate) fn classify_path_like(
    specifier: &str,
    language: Language,
    builtins: &Builtins,
) -> ImportCategory {
    if is_relative_specifier(specifier) {
        ImportCategory::Relative
    } else if specifier.starts_with('/') {
        ImportCategory::Absolute
    } else if builtins.is_builtin(language, specifier) {
        ImportCategory::Builtin
    } else {
        ImportCategory::External
    }
}

pub(crate) fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}
