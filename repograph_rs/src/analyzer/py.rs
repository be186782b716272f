//! Python extraction.
//!
//! Relative imports (`from .x import y`) resolve against the package
//! directory. Absolute imports that are not stdlib are probed against the file
//! set before being written off as third-party packages, since Python does
//! not distinguish `import mypkg` from `import requests` syntactically.

use crate::types::{ExportSymbol, ImportCategory, Language, SourceFile};

use super::extract::{ExtractContext, Extraction, ImportExtractor, LineIndex, RawImport};
use super::regexes::{regex_py_all, regex_py_class, regex_py_def, regex_py_from_import, regex_py_import};
use super::resolvers::normalize_path;

pub struct PythonExtractor;

impl ImportExtractor for PythonExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn extract(&self, content: &str, ctx: &ExtractContext<'_>) -> Extraction {
        let lines = LineIndex::new(content);
        let mut imports: Vec<(usize, RawImport)> = Vec::new();
        let classify = |module: &str| {
            if module.starts_with('.') {
                ImportCategory::Relative
            } else if ctx.builtins.is_builtin(Language::Python, module) {
                ImportCategory::Builtin
            } else {
                ImportCategory::External
            }
        };

        for caps in regex_py_import().captures_iter(content) {
            let Some(list) = caps.get(1) else { continue };
            let line = lines.line_of(list.start());
            for part in list.as_str().split(',') {
                // `a.b as c` imports `a.b`
                if let Some(module) = part.split_whitespace().next() {
                    imports.push((
                        list.start(),
                        RawImport::new(module, line, classify(module)),
                    ));
                }
            }
        }

        for caps in regex_py_from_import().captures_iter(content) {
            let (Some(module), Some(names)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let line = lines.line_of(module.start());
            let module_str = module.as_str();
            if module_str.chars().all(|c| c == '.') {
                // `from . import a, b`: each name may be a sibling module
                for name in imported_names(names.as_str()) {
                    let spec = format!("{module_str}{name}");
                    imports.push((module.start(), RawImport::new(spec, line, ImportCategory::Relative)));
                }
            } else {
                imports.push((
                    module.start(),
                    RawImport::new(module_str, line, classify(module_str)),
                ));
            }
        }

        imports.sort_by_key(|(offset, _)| *offset);

        Extraction {
            imports: imports.into_iter().map(|(_, import)| import).collect(),
            exports: parse_exports(content, &lines),
        }
    }

    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => relative_candidates(&import.specifier, file.dir()),
            ImportCategory::External | ImportCategory::Absolute => {
                let module = import.specifier.replace('.', "/");
                let mut bases = vec![module.clone(), format!("src/{module}")];
                // the first directory of the importer is often the python root
                if let Some((top, _)) = file.path.split_once('/')
                    && top != "src"
                {
                    bases.push(format!("{top}/{module}"));
                }
                bases
            }
            ImportCategory::Builtin => Vec::new(),
        }
    }

    fn package_name(&self, specifier: &str) -> String {
        specifier
            .split('.')
            .next()
            .unwrap_or(specifier)
            .to_string()
    }
}

/// `.a.b` from `pkg/x.py` -> `pkg/a/b`; `..a` climbs one package.
/// A single-segment module also falls back to the package itself, since
/// `from . import name` may name an attribute of `__init__`.
fn relative_candidates(specifier: &str, dir: &str) -> Vec<String> {
    let dots = specifier.chars().take_while(|c| *c == '.').count();
    let rest = &specifier[dots..];
    let mut base = dir.to_string();
    for _ in 1..dots {
        base.push_str("/..");
    }
    let Some(package) = normalize_path(&base) else {
        return Vec::new();
    };
    if rest.is_empty() {
        return vec![package];
    }

    let module = rest.replace('.', "/");
    let joined = if package.is_empty() {
        module
    } else {
        format!("{package}/{module}")
    };
    if rest.contains('.') {
        vec![joined]
    } else {
        vec![joined, package]
    }
}

fn imported_names(names: &str) -> Vec<&str> {
    names
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .filter_map(|item| item.split_whitespace().next())
        .filter(|name| *name != "*" && !name.is_empty())
        .collect()
}

fn parse_exports(content: &str, lines: &LineIndex) -> Vec<ExportSymbol> {
    if let Some(caps) = regex_py_all().captures(content)
        && let Some(list) = caps.get(1)
    {
        let line = lines.line_of(list.start());
        return list
            .as_str()
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|name| !name.is_empty())
            .map(|name| ExportSymbol::new(name, "__all__", line))
            .collect();
    }

    let mut exports: Vec<ExportSymbol> = Vec::new();
    for (re, kind) in [(regex_py_def(), "def"), (regex_py_class(), "class")] {
        for caps in re.captures_iter(content) {
            if let Some(name) = caps.get(1)
                && !name.as_str().starts_with('_')
            {
                exports.push(ExportSymbol::new(
                    name.as_str(),
                    kind,
                    lines.line_of(name.start()),
                ));
            }
        }
    }
    exports.sort_by_key(|e| e.line);
    exports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::builtins::Builtins;

    fn extract(content: &str) -> Extraction {
        let builtins = Builtins::default();
        let ctx = ExtractContext {
            path: "pkg/main.py",
            builtins: &builtins,
        };
        PythonExtractor.extract(content, &ctx)
    }

    fn file(path: &str) -> SourceFile {
        SourceFile {
            id: 0,
            path: path.to_string(),
            language: Language::Python,
            content: String::new(),
            size: 0,
            loc: 0,
            unparsed: None,
        }
    }

    #[test]
    fn classifies_import_forms() {
        let content = "\
import os, sys as system
import numpy.linalg
from .helpers import run
from ..shared.models import User
from . import utils, config
from typing import (
    Any,
)
";
        let extraction = extract(content);
        let got: Vec<(&str, ImportCategory, usize)> = extraction
            .imports
            .iter()
            .map(|i| (i.specifier.as_str(), i.category, i.line))
            .collect();
        assert_eq!(
            got,
            vec![
                ("os", ImportCategory::Builtin, 1),
                ("sys", ImportCategory::Builtin, 1),
                ("numpy.linalg", ImportCategory::External, 2),
                (".helpers", ImportCategory::Relative, 3),
                ("..shared.models", ImportCategory::Relative, 4),
                (".utils", ImportCategory::Relative, 5),
                (".config", ImportCategory::Relative, 5),
                ("typing", ImportCategory::Builtin, 6),
            ]
        );
    }

    #[test]
    fn relative_candidates_climb_packages() {
        assert_eq!(relative_candidates(".helpers", "app/core"), vec!["app/core/helpers", "app/core"]);
        assert_eq!(relative_candidates("..shared.models", "app/core"), vec!["app/shared/models"]);
        assert_eq!(relative_candidates(".", "app"), vec!["app"]);
        assert!(relative_candidates("...x", "app").is_empty());
    }

    #[test]
    fn absolute_modules_probe_local_roots() {
        let import = RawImport::new("services.billing", 1, ImportCategory::External);
        let bases = PythonExtractor.candidates(&import, &file("backend/api/views.py"));
        assert_eq!(
            bases,
            vec!["services/billing", "src/services/billing", "backend/services/billing"]
        );
        assert_eq!(PythonExtractor.package_name("numpy.linalg"), "numpy");
    }

    #[test]
    fn exports_prefer_dunder_all() {
        let with_all = extract("__all__ = ['run', \"stop\"]\ndef run(): pass\ndef _hidden(): pass\n");
        let names: Vec<&str> = with_all.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["run", "stop"]);

        let plain = extract("def run(): pass\nclass Job:\n    def method(self): pass\ndef _hidden(): pass\n");
        let names: Vec<&str> = plain.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["run", "Job"]);
    }
}
