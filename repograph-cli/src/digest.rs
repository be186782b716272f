//! Human-readable digest of a report (`--summary`).

use std::fmt::Write;

use repograph::Report;

const LISTED: usize = 10;

pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let s = &report.summary;
    let m = &report.metrics;

    let _ = writeln!(
        out,
        "files: {} ({} parsed, {} unsupported, {} unparsed), {} lines",
        s.files, s.parsed, s.unsupported, s.unparsed, s.loc
    );
    let languages: Vec<String> = s.languages.iter().map(|(l, n)| format!("{l} {n}")).collect();
    if !languages.is_empty() {
        let _ = writeln!(out, "languages: {}", languages.join(", "));
    }
    let _ = writeln!(
        out,
        "edges: {} internal, {} external, {} unresolved",
        s.internal_edges, s.external_edges, s.missing_edges
    );
    let _ = writeln!(
        out,
        "coupling {:.2}, complexity {}, components {}, density {:.4}",
        m.average_coupling, m.structural_complexity, m.connected_components, m.density
    );
    let _ = writeln!(out, "risk: {} ({}/100)", report.risk.level, report.risk.score);

    if !report.cycles.is_empty() {
        let _ = writeln!(out, "\ncycles ({}):", report.cycles.len());
        for cycle in report.cycles.iter().take(LISTED) {
            let _ = writeln!(out, "  [{}] {}", cycle.severity, cycle.files.join(" -> "));
        }
        more(&mut out, report.cycles.len());
    }

    if !report.issues.is_empty() {
        let _ = writeln!(out, "\nissues ({}):", report.issues.len());
        for issue in report.issues.iter().take(LISTED) {
            let _ = writeln!(
                out,
                "  {:<10} {:<6} {}",
                issue.kind.as_str(),
                issue.severity.as_str(),
                issue.target
            );
        }
        more(&mut out, report.issues.len());
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "\nrecommendations:");
        for rec in &report.recommendations {
            let _ = writeln!(out, "  - {}", rec.action);
        }
    }

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "\ndiagnostics ({}):", report.diagnostics.len());
        for d in report.diagnostics.iter().take(LISTED) {
            let _ = writeln!(out, "  {}: {}", d.subject, d.reason);
        }
        more(&mut out, report.diagnostics.len());
    }
    out
}

fn more(out: &mut String, total: usize) {
    if total > LISTED {
        let _ = writeln!(out, "  ... {} more", total - LISTED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repograph::{AnalysisInput, Analyzer, SourceInput};

    fn paired_cycles(count: usize) -> Report {
        let files = (0..count)
            .flat_map(|i| {
                [
                    SourceInput::text(format!("p{i:02}/a.js"), "import b from './b';"),
                    SourceInput::text(format!("p{i:02}/b.js"), "import a from './a';"),
                ]
            })
            .collect();
        Analyzer::default().analyze(&AnalysisInput {
            files,
            manifests: Vec::new(),
        })
    }

    #[test]
    fn long_sections_are_truncated_with_a_count() {
        let out = render(&paired_cycles(12));
        assert!(out.contains("cycles (12):"));
        assert!(out.contains("p09/a.js -> p09/b.js"));
        assert!(!out.contains("p10/a.js -> p10/b.js"));
        // cycles and their circular issues
        assert_eq!(out.matches("  ... 2 more").count(), 2);
    }

    #[test]
    fn short_sections_have_no_tail() {
        let out = render(&paired_cycles(3));
        assert!(out.contains("cycles (3):"));
        assert!(!out.contains("more"));
        assert!(out.contains("risk: medium (30/100)"));
    }
}
