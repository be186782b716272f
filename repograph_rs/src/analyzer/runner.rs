//! The analysis pipeline.
//!
//! ingest -> per-file extract/resolve (parallel) -> graph (barrier) ->
//! cycles | metrics | dependency issues (concurrent) -> risk.
//!
//! An [`Analyzer`] owns only its configuration and extractor table; each call
//! builds all state fresh, so one analyzer can serve concurrent calls.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::types::{Diagnostic, SourceInput};

use super::builtins::Builtins;
use super::cycles::find_cycles;
use super::extract::ExtractorRegistry;
use super::fingerprint::fingerprint;
use super::graph::DependencyGraph;
use super::issues::{Issue, circular_issues, dependency_issues};
use super::manifests::{ManifestDependencySet, ManifestInput};
use super::metrics::GraphMetrics;
use super::report::{Report, ReportSummary};
use super::resolvers::PathIndex;
use super::risk::{assess_risk, recommendations};
use super::scan::{ScanContext, ingest, scan_files};

/// Everything the retrieval layer hands over for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub files: Vec<SourceInput>,
    #[serde(default)]
    pub manifests: Vec<ManifestInput>,
}

pub struct Analyzer {
    config: AnalyzerConfig,
    registry: ExtractorRegistry,
    builtins: Builtins,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            builtins: Builtins::new(&config.extra_builtins),
            registry: ExtractorRegistry::default(),
            config,
        }
    }

    /// Replace the extractor table, e.g. to add a language.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one input set. Never fails: degradations are recorded in
    /// [`Report::diagnostics`].
    pub fn analyze(&self, input: &AnalysisInput) -> Report {
        let fingerprint = fingerprint(input);
        let (files, mut diagnostics) = ingest(&input.files, self.config.max_file_bytes);
        let manifests = load_manifests(&input.manifests, &mut diagnostics);

        let index = PathIndex::new(&files);
        let ctx = ScanContext {
            registry: &self.registry,
            builtins: &self.builtins,
            index: &index,
        };
        let workers = self.config.workers_for(files.len());
        let records = scan_files(&files, &ctx, workers);
        for record in records.iter().filter(|r| r.is_unparsed()) {
            debug!(path = %record.path, "file contributes no imports");
        }

        let graph = DependencyGraph::build(&records);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );

        let (cycles, metrics, dep_issues) = thread::scope(|s| {
            let cycles = s.spawn(|| find_cycles(&graph));
            let metrics = s.spawn(|| GraphMetrics::compute(&graph));
            let issues =
                s.spawn(|| dependency_issues(&records, &manifests, &self.config.ignore_unused));
            (
                joined(cycles.join(), "cycle detection", &mut diagnostics),
                joined(metrics.join(), "metrics", &mut diagnostics),
                joined(issues.join(), "issue detection", &mut diagnostics),
            )
        });

        let mut issues: Vec<Issue> = circular_issues(&cycles);
        issues.extend(dep_issues);

        let risk = assess_risk(&cycles, &issues, &metrics);
        let recommendations = recommendations(&risk, &issues);
        let summary = ReportSummary::from_records(&records, &graph);

        info!(
            files = summary.files,
            edges = summary.internal_edges,
            cycles = cycles.len(),
            issues = issues.len(),
            score = risk.score,
            level = %risk.level,
            "analysis complete"
        );

        Report {
            fingerprint,
            summary,
            files: records,
            graph,
            metrics,
            cycles,
            manifests,
            issues,
            risk,
            recommendations,
            diagnostics,
        }
    }
}

fn load_manifests(inputs: &[ManifestInput], diagnostics: &mut Vec<Diagnostic>) -> Vec<ManifestDependencySet> {
    let mut sets = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        match input.to_dependency_set(index) {
            Ok(set) => sets.push(set),
            Err(err) => {
                let label = input.label(index);
                warn!(manifest = %label, error = %err, "skipping manifest");
                diagnostics.push(Diagnostic::new(label, format!("manifest skipped: {err}")));
            }
        }
    }
    sets
}

/// A panicked stage degrades to its empty result.
fn joined<T: Default>(result: thread::Result<T>, stage: &str, diagnostics: &mut Vec<Diagnostic>) -> T {
    result.unwrap_or_else(|_| {
        warn!(stage, "analysis stage panicked");
        diagnostics.push(Diagnostic::new(stage, "stage panicked, result omitted"));
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::risk::RiskLevel;
    use crate::types::Severity;
    use serde_json::json;

    #[test]
    fn empty_input_is_an_empty_low_risk_report() {
        let report = Analyzer::default().analyze(&AnalysisInput::default());
        assert_eq!(report.graph.node_count(), 0);
        assert_eq!(report.graph.edge_count(), 0);
        assert!(report.cycles.is_empty());
        assert!(report.issues.is_empty());
        assert_eq!(report.risk.score, 0);
        assert_eq!(report.risk.level, RiskLevel::Low);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn malformed_manifest_is_skipped_with_diagnostic() {
        let input = AnalysisInput {
            files: vec![SourceInput::text("a.js", "import pad from 'left-pad';")],
            manifests: vec![
                ManifestInput::file("package.json", "{ broken"),
                ManifestInput::Parsed(json!({"dependencies": {"left-pad": "^1.0.0"}})),
            ],
        };
        let report = Analyzer::default().analyze(&input);
        assert_eq!(report.manifests.len(), 1);
        assert!(report.issues.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].subject, "package.json");
    }

    #[test]
    fn cycle_flows_into_issues_and_risk() {
        let input = AnalysisInput {
            files: vec![
                SourceInput::text("src/a.ts", "import { b } from './b';"),
                SourceInput::text("src/b.ts", "import { a } from './a';"),
            ],
            manifests: Vec::new(),
        };
        let report = Analyzer::default().analyze(&input);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.issues[0].target, "src/a.ts -> src/b.ts");
        assert_eq!(report.issues[0].severity, Severity::Medium);
        assert_eq!(report.risk.score, 10);
    }

    #[test]
    fn configured_builtins_and_ignores_apply() {
        let config = AnalyzerConfig {
            max_workers: 2,
            extra_builtins: vec!["electron".to_string()],
            ignore_unused: vec!["typescript".to_string()],
            ..AnalyzerConfig::default()
        };
        let input = AnalysisInput {
            files: vec![SourceInput::text("main.js", "const { app } = require('electron');")],
            manifests: vec![ManifestInput::Parsed(
                json!({"devDependencies": {"typescript": "^5.0.0"}}),
            )],
        };
        let report = Analyzer::new(config).analyze(&input);
        assert!(report.issues.is_empty());
        assert!(report.files[0].dependencies.is_empty());
    }
}
