//! The serializable result of one analysis run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Diagnostic, EdgeKind, FileRecord, FileStatus};

use super::cycles::Cycle;
use super::graph::DependencyGraph;
use super::issues::Issue;
use super::manifests::ManifestDependencySet;
use super::metrics::GraphMetrics;
use super::risk::{Recommendation, RiskAssessment};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files: usize,
    pub parsed: usize,
    pub unsupported: usize,
    pub unparsed: usize,
    pub loc: usize,
    pub internal_edges: usize,
    pub external_edges: usize,
    pub missing_edges: usize,
    /// Language -> file count.
    pub languages: BTreeMap<String, usize>,
}

impl ReportSummary {
    pub fn from_records(records: &[FileRecord], graph: &DependencyGraph) -> Self {
        let mut summary = Self {
            files: records.len(),
            internal_edges: graph.edge_count(),
            ..Self::default()
        };
        for record in records {
            match record.status {
                FileStatus::Parsed => summary.parsed += 1,
                FileStatus::Unsupported => summary.unsupported += 1,
                FileStatus::Unparsed { .. } => summary.unparsed += 1,
            }
            summary.loc += record.loc;
            summary.external_edges += record.edges_of(EdgeKind::External).count();
            summary.missing_edges += record.edges_of(EdgeKind::Missing).count();
            *summary
                .languages
                .entry(record.language.as_str().to_string())
                .or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Cache key of the input that produced this report.
    pub fingerprint: String,
    pub summary: ReportSummary,
    pub files: Vec<FileRecord>,
    pub graph: DependencyGraph,
    pub metrics: GraphMetrics,
    pub cycles: Vec<Cycle>,
    pub manifests: Vec<ManifestDependencySet>,
    pub issues: Vec<Issue>,
    pub risk: RiskAssessment,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
