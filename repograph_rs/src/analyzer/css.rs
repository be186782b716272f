//! CSS / SCSS / Less `@import` extraction.
//!
//! A bare specifier is relative in CSS; `~pkg/x` reaches into
//! `node_modules` and is treated as an external package.

use crate::types::{ImportCategory, Language, SourceFile};

use super::extract::{ExtractContext, Extraction, ImportExtractor, LineIndex, RawImport};
use super::js::npm_package_name;
use super::regexes::regex_css_import;
use super::resolvers::join_relative;

pub struct CssExtractor;

impl ImportExtractor for CssExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Css]
    }

    fn extract(&self, content: &str, _ctx: &ExtractContext<'_>) -> Extraction {
        let lines = LineIndex::new(content);
        let imports = regex_css_import()
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .filter(|m| !is_remote(m.as_str()))
            .map(|m| {
                let spec = m.as_str();
                let line = lines.line_of(m.start());
                match spec.strip_prefix('~') {
                    Some(package) => RawImport::new(package, line, ImportCategory::External),
                    None if spec.starts_with('/') => {
                        RawImport::new(spec, line, ImportCategory::Absolute)
                    }
                    None => RawImport::new(spec, line, ImportCategory::Relative),
                }
            })
            .collect();

        Extraction {
            imports,
            exports: Vec::new(),
        }
    }

    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        match import.category {
            ImportCategory::Relative => {
                let Some(base) = join_relative(file.dir(), &import.specifier) else {
                    return Vec::new();
                };
                // Sass partials: `@import "vars"` loads `_vars.scss`
                let partial = match base.rsplit_once('/') {
                    Some((dir, name)) => format!("{dir}/_{name}"),
                    None => format!("_{base}"),
                };
                vec![base, partial]
            }
            ImportCategory::Absolute => vec![import.specifier.trim_start_matches('/').to_string()],
            ImportCategory::Builtin | ImportCategory::External => Vec::new(),
        }
    }

    fn package_name(&self, specifier: &str) -> String {
        npm_package_name(specifier)
    }
}

fn is_remote(spec: &str) -> bool {
    spec.starts_with("http://")
        || spec.starts_with("https://")
        || spec.starts_with("//")
        || spec.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::builtins::Builtins;

    #[test]
    fn import_forms() {
        let content = r#"@import "reset.css";
@import url("./theme/dark.css");
@import url(https://fonts.example.com/inter.css);
@import '~bootstrap/scss/grid';
@import "/static/base.css";
"#;
        let builtins = Builtins::default();
        let ctx = ExtractContext {
            path: "styles/main.scss",
            builtins: &builtins,
        };
        let extraction = CssExtractor.extract(content, &ctx);
        let got: Vec<(&str, ImportCategory, usize)> = extraction
            .imports
            .iter()
            .map(|i| (i.specifier.as_str(), i.category, i.line))
            .collect();
        assert_eq!(
            got,
            vec![
                ("reset.css", ImportCategory::Relative, 1),
                ("./theme/dark.css", ImportCategory::Relative, 2),
                ("bootstrap/scss/grid", ImportCategory::External, 4),
                ("/static/base.css", ImportCategory::Absolute, 5),
            ]
        );
        assert_eq!(CssExtractor.package_name("bootstrap/scss/grid"), "bootstrap");
    }

    #[test]
    fn relative_candidates_include_partial() {
        let file = SourceFile {
            id: 0,
            path: "styles/main.scss".into(),
            language: Language::Css,
            content: String::new(),
            size: 0,
            loc: 0,
            unparsed: None,
        };
        let import = RawImport::new("vars", 1, ImportCategory::Relative);
        assert_eq!(
            CssExtractor.candidates(&import, &file),
            vec!["styles/vars", "styles/_vars"]
        );
    }
}
