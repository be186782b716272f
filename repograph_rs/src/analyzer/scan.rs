//! Ingestion and the per-file extract + resolve pass.
//!
//! Each file's work depends only on its own content and the read-only path
//! index, so files are split into chunks and scanned on scoped threads with no
//! shared mutable state. A file whose scan panics degrades to an unparsed
//! record; the rest of the batch is unaffected.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use tracing::{debug, warn};

use crate::types::{
    DependencyEdge, Diagnostic, EdgeTarget, FileContent, FileRecord, FileStatus, Import,
    ImportCategory, Language, SourceFile, SourceInput,
};

use super::builtins::Builtins;
use super::extract::{ExtractContext, ExtractorRegistry};
use super::resolvers::{PathIndex, normalize_path};

pub(crate) struct ScanContext<'a> {
    pub registry: &'a ExtractorRegistry,
    pub builtins: &'a Builtins,
    pub index: &'a PathIndex,
}

/// Node path for an input path: the normalized path, or for a path that
/// escapes the root its slash-normalized spelling flagged as escaping.
/// `None` for an empty path.
pub(crate) fn node_path(raw: &str) -> Option<(String, bool)> {
    match normalize_path(raw) {
        Some(path) if !path.is_empty() => Some((path, false)),
        Some(_) => None,
        None => Some((raw.replace('\\', "/"), true)),
    }
}

/// Turn input records into [`SourceFile`]s with dense ids.
///
/// Ids follow path order, so the report depends only on the file set and not
/// on the order it was supplied in. Records with an empty or duplicate path
/// are dropped with a diagnostic (the first occurrence wins); undecodable
/// payloads and paths escaping the root are kept as unparsed files.
pub(crate) fn ingest(inputs: &[SourceInput], max_file_bytes: usize) -> (Vec<SourceFile>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted: Vec<(String, bool, &SourceInput)> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let Some((path, escapes)) = node_path(&input.path) else {
            warn!(path = %input.path, "dropping file with empty path");
            diagnostics.push(Diagnostic::new(&input.path, "path is empty"));
            continue;
        };
        if !seen.insert(path.clone()) {
            warn!(%path, "dropping duplicate file");
            diagnostics.push(Diagnostic::new(&path, "duplicate path, first occurrence kept"));
            continue;
        }
        accepted.push((path, escapes, input));
    }
    accepted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut files: Vec<SourceFile> = Vec::with_capacity(accepted.len());
    for (path, escapes, input) in accepted {
        let language = Language::detect(input.language.as_deref(), &path);
        let (content, size, unparsed) = if escapes {
            let size = input.content.as_bytes().len();
            (String::new(), size, Some("path escapes the root".to_string()))
        } else {
            decode(&input.content, max_file_bytes)
        };
        if let Some(reason) = &unparsed {
            debug!(%path, %reason, "file will not be scanned");
            diagnostics.push(Diagnostic::new(&path, reason.clone()));
        }

        files.push(SourceFile {
            id: files.len(),
            loc: content.lines().count(),
            path,
            language,
            content,
            size,
            unparsed,
        });
    }

    (files, diagnostics)
}

fn decode(content: &FileContent, max_file_bytes: usize) -> (String, usize, Option<String>) {
    let size = content.as_bytes().len();
    if size > max_file_bytes {
        return (
            String::new(),
            size,
            Some(format!("file exceeds {max_file_bytes} bytes")),
        );
    }

    let text = match content {
        FileContent::Text(text) => text.clone(),
        FileContent::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(err) => {
                return (
                    String::new(),
                    size,
                    Some(format!("content is not valid UTF-8 ({err})")),
                );
            }
        },
    };

    if text.contains('\0') {
        return (String::new(), size, Some("binary content".to_string()));
    }
    (text, size, None)
}

/// Extract and resolve one file.
pub(crate) fn analyze_file(file: &SourceFile, ctx: &ScanContext<'_>) -> FileRecord {
    if let Some(reason) = &file.unparsed {
        return FileRecord::unparsed(file, reason.clone());
    }

    let mut record = FileRecord::new(file);
    if !ctx.registry.supports(file.language) {
        record.status = FileStatus::Unsupported;
        return record;
    }

    let extractor = ctx.registry.for_language(file.language);
    let extraction = extractor.extract(
        &file.content,
        &ExtractContext {
            path: &file.path,
            builtins: ctx.builtins,
        },
    );

    for raw in extraction.imports {
        let mut category = raw.category;
        let target = match raw.category {
            ImportCategory::Builtin => None,
            ImportCategory::Relative | ImportCategory::Absolute => {
                let bases = extractor.candidates(&raw, file);
                Some(match extractor.resolve(&bases, ctx.index) {
                    Some(target) => EdgeTarget::Internal { target },
                    None => EdgeTarget::Missing,
                })
            }
            ImportCategory::External => {
                let bases = extractor.candidates(&raw, file);
                Some(match extractor.resolve(&bases, ctx.index) {
                    Some(target) => {
                        category = ImportCategory::Absolute;
                        EdgeTarget::Internal { target }
                    }
                    None => EdgeTarget::External {
                        package: extractor.package_name(&raw.specifier),
                    },
                })
            }
        };

        if let Some(target) = target {
            record.dependencies.push(DependencyEdge {
                source: file.id,
                specifier: raw.specifier.clone(),
                line: raw.line,
                target,
            });
        }
        record.imports.push(Import {
            file: file.id,
            specifier: raw.specifier,
            line: raw.line,
            category,
        });
    }
    record.exports = extraction.exports;
    record
}

fn analyze_isolated(file: &SourceFile, ctx: &ScanContext<'_>) -> FileRecord {
    match catch_unwind(AssertUnwindSafe(|| analyze_file(file, ctx))) {
        Ok(record) => record,
        Err(_) => {
            warn!(path = %file.path, "extraction panicked, marking file unparsed");
            FileRecord::unparsed(file, "extraction panicked")
        }
    }
}

/// Scan all files, preserving input order in the output.
pub(crate) fn scan_files(files: &[SourceFile], ctx: &ScanContext<'_>, workers: usize) -> Vec<FileRecord> {
    if workers <= 1 || files.len() <= 1 {
        return files.iter().map(|f| analyze_isolated(f, ctx)).collect();
    }

    let chunk_size = files.len().div_ceil(workers);
    debug!(files = files.len(), workers, chunk_size, "scanning files in parallel");

    thread::scope(|s| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = s.spawn(move || {
                    chunk
                        .iter()
                        .map(|f| analyze_isolated(f, ctx))
                        .collect::<Vec<_>>()
                });
                (chunk, handle)
            })
            .collect();

        let mut records = Vec::with_capacity(files.len());
        for (chunk, handle) in handles {
            match handle.join() {
                Ok(chunk_records) => records.extend(chunk_records),
                Err(_) => {
                    warn!(files = chunk.len(), "scan worker panicked");
                    records.extend(
                        chunk
                            .iter()
                            .map(|f| FileRecord::unparsed(f, "scan worker panicked")),
                    );
                }
            }
        }
        records
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeKind, FileId};

    fn scan(inputs: Vec<SourceInput>, workers: usize) -> (Vec<SourceFile>, Vec<FileRecord>) {
        let (files, _) = ingest(&inputs, 1024);
        let registry = ExtractorRegistry::default();
        let builtins = Builtins::default();
        let index = PathIndex::new(&files);
        let ctx = ScanContext {
            registry: &registry,
            builtins: &builtins,
            index: &index,
        };
        let records = scan_files(&files, &ctx, workers);
        (files, records)
    }

    #[test]
    fn ingest_normalizes_and_drops_duplicates() {
        let inputs = vec![
            SourceInput::text("./src/a.ts", ""),
            SourceInput::text("src\\a.ts", ""),
            SourceInput::text("", ""),
            SourceInput::bytes("bin/blob.js", vec![0xff, 0xfe]),
            SourceInput::text("big.js", "x".repeat(2048)),
        ];
        let (files, diagnostics) = ingest(&inputs, 1024);
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["big.js", "bin/blob.js", "src/a.ts"]);
        assert_eq!(files[1].id, 1);
        assert!(files[0].unparsed.as_deref().unwrap().contains("exceeds"));
        assert!(files[1].unparsed.as_deref().unwrap().contains("UTF-8"));
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn ids_follow_path_order_not_input_order() {
        let forward = vec![
            SourceInput::text("a.js", "import b from './b';"),
            SourceInput::text("b.js", ""),
            SourceInput::text("c.js", ""),
        ];
        let mut shuffled = forward.clone();
        shuffled.rotate_left(2);
        let (first, _) = ingest(&forward, 1024);
        let (second, _) = ingest(&shuffled, 1024);
        let ids = |files: &[SourceFile]| -> Vec<(FileId, String)> {
            files.iter().map(|f| (f.id, f.path.clone())).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn escaping_path_is_kept_as_unparsed_node() {
        let (files, diagnostics) = ingest(
            &[
                SourceInput::text("src/a.ts", "import x from '../../outside';"),
                SourceInput::text("../outside.ts", "export const x = 1;"),
            ],
            1024,
        );
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "../outside.ts");
        assert_eq!(files[0].unparsed.as_deref(), Some("path escapes the root"));
        assert!(files[0].content.is_empty());
        assert_eq!(files[0].size, 19);
        assert_eq!(diagnostics.len(), 1);

        let registry = ExtractorRegistry::default();
        let builtins = Builtins::default();
        let index = PathIndex::new(&files);
        let ctx = ScanContext {
            registry: &registry,
            builtins: &builtins,
            index: &index,
        };
        let records = scan_files(&files, &ctx, 1);
        assert!(records[0].is_unparsed());
        assert_eq!(records[1].dependencies[0].kind(), EdgeKind::Missing);
    }

    #[test]
    fn resolves_internal_missing_and_external() {
        let (_, records) = scan(
            vec![
                SourceInput::text("src/a.js", "import b from './b';\nimport c from './c';\nimport pad from 'left-pad/lib';\nimport fs from 'fs';"),
                SourceInput::text("src/b.js", ""),
            ],
            1,
        );
        let a = &records[0];
        let kinds: Vec<EdgeKind> = a.dependencies.iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![EdgeKind::Internal, EdgeKind::Missing, EdgeKind::External]);
        assert_eq!(a.dependencies[0].internal_target(), Some(1));
        assert_eq!(a.dependencies[2].package(), Some("left-pad"));
        assert_eq!(a.imports.len(), 4);
        assert_eq!(a.imports[3].category, ImportCategory::Builtin);
    }

    #[test]
    fn python_local_module_becomes_absolute() {
        let (_, records) = scan(
            vec![
                SourceInput::text("app/main.py", "import services.billing\nimport requests\n"),
                SourceInput::text("services/billing.py", ""),
            ],
            1,
        );
        let main = &records[0];
        assert_eq!(main.imports[0].category, ImportCategory::Absolute);
        assert_eq!(main.dependencies[0].internal_target(), Some(1));
        assert_eq!(main.imports[1].category, ImportCategory::External);
        assert_eq!(main.dependencies[1].package(), Some("requests"));
    }

    #[test]
    fn unsupported_and_unparsed_files_have_no_imports() {
        let (_, records) = scan(
            vec![
                SourceInput::text("README.md", "import x from './y'"),
                SourceInput::bytes("a.js", vec![b'a', 0, b'b']),
            ],
            1,
        );
        assert_eq!(records[0].status, FileStatus::Unsupported);
        assert!(records[0].imports.is_empty());
        assert!(records[1].is_unparsed());
        assert!(records[1].dependencies.is_empty());
    }

    #[test]
    fn parallel_scan_matches_sequential_order() {
        let inputs: Vec<SourceInput> = (0..25)
            .map(|i| SourceInput::text(format!("m{i}.js"), format!("import n from './m{}';", (i + 1) % 25)))
            .collect();
        let (_, sequential) = scan(inputs.clone(), 1);
        let (_, parallel) = scan(inputs, 4);
        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.path, p.path);
            assert_eq!(s.dependencies, p.dependencies);
        }
    }
}
