//! JavaScript / TypeScript extraction.

use crate::types::{ExportSymbol, ImportCategory, Language, SourceFile};

use super::extract::{
    ExtractContext, Extraction, ImportExtractor, LineIndex, RawImport, classify_path_like,
};
use super::regexes::{
    regex_dynamic_import, regex_export_brace, regex_export_default, regex_export_named_decl,
    regex_import, regex_reexport, regex_require, regex_side_effect_import,
};
use super::resolvers::join_relative;

/// Source-root aliases bundlers commonly wire up (`@/x`, `~/x`).
const ROOT_ALIASES: &[&str] = &["@/", "~/"];

pub struct JsExtractor;

impl ImportExtractor for JsExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::JavaScript, Language::TypeScript]
    }

    fn extract(&self, content: &str, ctx: &ExtractContext<'_>) -> Extraction {
        let lines = LineIndex::new(content);
        let language = match Language::from_path(ctx.path) {
            Language::TypeScript => Language::TypeScript,
            _ => Language::JavaScript,
        };

        let mut found: Vec<(usize, &str)> = Vec::new();
        for caps in regex_import().captures_iter(content) {
            if let Some(m) = caps.get(2) {
                found.push((m.start(), m.as_str()));
            }
        }
        for re in [
            regex_side_effect_import(),
            regex_reexport(),
            regex_dynamic_import(),
            regex_require(),
        ] {
            for caps in re.captures_iter(content) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), m.as_str()));
                }
            }
        }
        found.sort_by_key(|(offset, _)| *offset);

        let imports = found
            .into_iter()
            .filter(|(_, spec)| !is_remote(spec))
            .map(|(offset, spec)| {
                RawImport::new(
                    spec,
                    lines.line_of(offset),
                    classify(spec, language, ctx),
                )
            })
            .collect();

        Extraction {
            imports,
            exports: parse_exports(content, &lines),
        }
    }

    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => join_relative(file.dir(), &import.specifier)
                .into_iter()
                .collect(),
            ImportCategory::Absolute => {
                match ROOT_ALIASES
                    .iter()
                    .find_map(|alias| import.specifier.strip_prefix(alias))
                {
                    Some(rest) => vec![format!("src/{rest}"), rest.to_string()],
                    None => vec![import.specifier.trim_start_matches('/').to_string()],
                }
            }
            ImportCategory::Builtin | ImportCategory::External => Vec::new(),
        }
    }

    fn package_name(&self, specifier: &str) -> String {
        npm_package_name(specifier)
    }
}

fn classify(spec: &str, language: Language, ctx: &ExtractContext<'_>) -> ImportCategory {
    if ROOT_ALIASES.iter().any(|alias| spec.starts_with(alias)) {
        return ImportCategory::Absolute;
    }
    classify_path_like(spec, language, ctx.builtins)
}

fn is_remote(spec: &str) -> bool {
    spec.starts_with("http://")
        || spec.starts_with("https://")
        || spec.starts_with("data:")
        || spec.starts_with('#')
}

/// `@scope/name/sub` -> `@scope/name`, `name/sub` -> `name`.
pub(crate) fn npm_package_name(specifier: &str) -> String {
    let spec = specifier.strip_prefix("npm:").unwrap_or(specifier);
    let mut parts = spec.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
        (Some(name), _) => name.to_string(),
        _ => spec.to_string(),
    }
}

fn parse_exports(content: &str, lines: &LineIndex) -> Vec<ExportSymbol> {
    let mut exports = Vec::new();

    for caps in regex_export_named_decl().captures_iter(content) {
        if let (Some(kind), Some(name)) = (caps.get(1), caps.get(2)) {
            let kind = kind.as_str().trim_end_matches('*');
            exports.push(ExportSymbol::new(
                name.as_str(),
                kind,
                lines.line_of(name.start()),
            ));
        }
    }

    for caps in regex_export_default().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or("default");
        exports.push(ExportSymbol::new(name, "default", lines.line_of(whole.start())));
    }

    for caps in regex_export_brace().captures_iter(content) {
        let Some(list) = caps.get(1) else { continue };
        let line = lines.line_of(list.start());
        for item in list.as_str().split(',') {
            // `a as b` exports `b`
            let name = item
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .trim();
            if !name.is_empty() {
                exports.push(ExportSymbol::new(name, "named", line));
            }
        }
    }

    exports.sort_by_key(|e| e.line);
    exports
}
