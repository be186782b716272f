//! # repograph
//!
//! Dependency graph analysis over an already-fetched set of source files.
//!
//! Given file contents and package manifests, the analyzer extracts imports
//! with per-language text heuristics, resolves them against the file set,
//! builds a directed graph, and reports:
//!
//! - **Cycles** among internal imports
//! - **Metrics**: fan-in, fan-out, instability, coupling, structural complexity
//! - **Issues**: unused and missing declared dependencies, unresolved imports
//! - **Risk**: a bounded score with prioritized recommendations
//!
//! The core performs no I/O. It never fails on bad input; unreadable files and
//! manifests degrade and are listed in [`Report::diagnostics`].
//!
//! ```rust
//! use repograph::{AnalysisInput, Analyzer, ManifestInput, SourceInput};
//!
//! let input = AnalysisInput {
//!     files: vec![
//!         SourceInput::text("src/a.ts", "import { b } from './b';"),
//!         SourceInput::text("src/b.ts", "import pad from 'left-pad';"),
//!     ],
//!     manifests: vec![ManifestInput::file(
//!         "package.json",
//!         r#"{"dependencies": {"left-pad": "^1.0.0"}}"#,
//!     )],
//! };
//!
//! let report = Analyzer::default().analyze(&input);
//! assert_eq!(report.graph.edge_count(), 1);
//! assert!(report.issues.is_empty());
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod types;

pub use analyzer::cycles::Cycle;
pub use analyzer::extract::{ExtractContext, Extraction, ExtractorRegistry, ImportExtractor, RawImport};
pub use analyzer::graph::{DependencyGraph, GraphEdge, GraphNode};
pub use analyzer::issues::{Issue, IssueKind};
pub use analyzer::manifests::{ManifestDependencySet, ManifestInput, is_manifest_path};
pub use analyzer::metrics::{GraphMetrics, NodeMetrics};
pub use analyzer::report::{Report, ReportSummary};
pub use analyzer::risk::{Priority, Recommendation, RiskAssessment, RiskLevel};
pub use analyzer::{AnalysisInput, Analyzer};
pub use config::AnalyzerConfig;
pub use error::{ConfigError, ManifestError};
pub use types::{
    DependencyEdge, Diagnostic, EdgeKind, FileContent, FileId, FileRecord, FileStatus, Import,
    ImportCategory, Language, Severity, SourceFile, SourceInput,
};
