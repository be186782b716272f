//! C / C++ `#include` extraction.
//!
//! Quoted includes are project headers and resolve like relative imports;
//! angle-bracket includes come from the toolchain or system and are builtin.

use crate::types::{ImportCategory, Language, SourceFile};

use super::extract::{ExtractContext, Extraction, ImportExtractor, LineIndex, RawImport};
use super::resolvers::{join_relative, normalize_path};
use super::regexes::regex_c_include;

pub struct CExtractor;

impl ImportExtractor for CExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::C, Language::Cpp]
    }

    fn extract(&self, content: &str, _ctx: &ExtractContext<'_>) -> Extraction {
        let lines = LineIndex::new(content);
        let imports = regex_c_include()
            .captures_iter(content)
            .filter_map(|caps| {
                let delim = caps.get(1)?;
                let header = caps.get(2)?;
                let category = if delim.as_str() == "<" {
                    ImportCategory::Builtin
                } else {
                    ImportCategory::Relative
                };
                Some(RawImport::new(
                    header.as_str().trim(),
                    lines.line_of(header.start()),
                    category,
                ))
            })
            .collect();

        Extraction {
            imports,
            exports: Vec::new(),
        }
    }

    /// Next to the includer first, then the usual include roots.
    fn candidates(&self, import: &RawImport, file: &SourceFile) -> Vec<String> {
        if import.category != ImportCategory::Relative {
            return Vec::new();
        }
        let mut bases: Vec<String> = Vec::new();
        for candidate in [
            join_relative(file.dir(), &import.specifier),
            normalize_path(&import.specifier),
            normalize_path(&format!("include/{}", import.specifier)),
        ]
        .into_iter()
        .flatten()
        {
            if !bases.contains(&candidate) {
                bases.push(candidate);
            }
        }
        bases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::builtins::Builtins;

    #[test]
    fn quoted_and_angle_includes() {
        let content = "#include <stdio.h>\n#include \"util/strings.h\"\n  #  include \"local.h\"\n";
        let builtins = Builtins::default();
        let ctx = ExtractContext {
            path: "src/main.c",
            builtins: &builtins,
        };
        let extraction = CExtractor.extract(content, &ctx);
        let got: Vec<(&str, ImportCategory, usize)> = extraction
            .imports
            .iter()
            .map(|i| (i.specifier.as_str(), i.category, i.line))
            .collect();
        assert_eq!(
            got,
            vec![
                ("stdio.h", ImportCategory::Builtin, 1),
                ("util/strings.h", ImportCategory::Relative, 2),
                ("local.h", ImportCategory::Relative, 3),
            ]
        );

        let file = SourceFile {
            id: 0,
            path: "src/main.c".into(),
            language: Language::C,
            content: content.into(),
            size: content.len(),
            loc: 3,
            unparsed: None,
        };
        assert_eq!(
            CExtractor.candidates(&extraction.imports[1], &file),
            vec!["src/util/strings.h", "util/strings.h", "include/util/strings.h"]
        );
    }
}
