//! Additive risk score and recommendations.
//!
//! Each triggered condition adds a fixed weight; the total is clamped to
//! 0..=100 and bucketed. The assessment is a pure function of its inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cycles::Cycle;
use super::issues::{Issue, IssueKind, count_of};
use super::metrics::GraphMetrics;

pub const CIRCULAR_WEIGHT: u32 = 10;
pub const MISSING_WEIGHT: u32 = 20;
pub const UNUSED_PENALTY: u32 = 15;
pub const COUPLING_PENALTY: u32 = 20;
pub const COMPLEXITY_PENALTY: u32 = 15;

/// More unused dependencies than this adds [`UNUSED_PENALTY`].
pub const UNUSED_THRESHOLD: usize = 5;
/// Mean fan-out above this adds [`COUPLING_PENALTY`].
pub const COUPLING_THRESHOLD: f64 = 5.0;
/// Structural complexity above this adds [`COMPLEXITY_PENALTY`].
pub const COMPLEXITY_THRESHOLD: usize = 50;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..20 => RiskLevel::Low,
            20..50 => RiskLevel::Medium,
            50..80 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(format!("unknown risk level `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Circular,
    Missing,
    Unused,
    Coupling,
    Complexity,
}

/// One triggered condition and what it added to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub contribution: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Low,
            factors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RiskCategory,
    pub action: String,
}

pub fn assess_risk(cycles: &[Cycle], issues: &[Issue], metrics: &GraphMetrics) -> RiskAssessment {
    let mut factors = Vec::new();

    let circular = cycles.len();
    if circular > 0 {
        factors.push(RiskFactor {
            category: RiskCategory::Circular,
            contribution: weighted(circular, CIRCULAR_WEIGHT),
            description: format!("{circular} circular dependency chain(s)"),
        });
    }

    let missing = count_of(issues, IssueKind::Missing);
    if missing > 0 {
        factors.push(RiskFactor {
            category: RiskCategory::Missing,
            contribution: weighted(missing, MISSING_WEIGHT),
            description: format!("{missing} imported package(s) not declared"),
        });
    }

    let unused = count_of(issues, IssueKind::Unused);
    if unused > UNUSED_THRESHOLD {
        factors.push(RiskFactor {
            category: RiskCategory::Unused,
            contribution: UNUSED_PENALTY,
            description: format!("{unused} declared dependencies are never imported"),
        });
    }

    if metrics.average_coupling > COUPLING_THRESHOLD {
        factors.push(RiskFactor {
            category: RiskCategory::Coupling,
            contribution: COUPLING_PENALTY,
            description: format!(
                "average coupling {:.2} exceeds {COUPLING_THRESHOLD}",
                metrics.average_coupling
            ),
        });
    }

    if metrics.structural_complexity > COMPLEXITY_THRESHOLD {
        factors.push(RiskFactor {
            category: RiskCategory::Complexity,
            contribution: COMPLEXITY_PENALTY,
            description: format!(
                "structural complexity {} exceeds {COMPLEXITY_THRESHOLD}",
                metrics.structural_complexity
            ),
        });
    }

    let score = factors
        .iter()
        .fold(0u32, |acc, f| acc.saturating_add(f.contribution))
        .min(MAX_SCORE);

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}

fn weighted(count: usize, weight: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(weight)
}

/// One recommendation per triggered factor, in factor order.
pub fn recommendations(assessment: &RiskAssessment, issues: &[Issue]) -> Vec<Recommendation> {
    assessment
        .factors
        .iter()
        .map(|factor| match factor.category {
            RiskCategory::Circular => Recommendation {
                priority: Priority::High,
                category: factor.category,
                action: format!(
                    "Break {}: extract the shared code into a module both sides can import, or invert one dependency.",
                    factor.description
                ),
            },
            RiskCategory::Missing => Recommendation {
                priority: Priority::High,
                category: factor.category,
                action: format!(
                    "Declare the missing packages in a manifest: {}.",
                    issue_targets(issues, IssueKind::Missing)
                ),
            },
            RiskCategory::Unused => Recommendation {
                priority: Priority::Medium,
                category: factor.category,
                action: format!(
                    "Remove unused dependencies to shrink the install footprint: {}.",
                    issue_targets(issues, IssueKind::Unused)
                ),
            },
            RiskCategory::Coupling => Recommendation {
                priority: Priority::Medium,
                category: factor.category,
                action: format!(
                    "Reduce coupling ({}): split files with many imports and introduce narrower interfaces.",
                    factor.description
                ),
            },
            RiskCategory::Complexity => Recommendation {
                priority: Priority::Medium,
                category: factor.category,
                action: format!(
                    "Simplify the module structure ({}): group related files and remove cross-cutting imports.",
                    factor.description
                ),
            },
        })
        .collect()
}

/// Up to five targets, comma separated.
fn issue_targets(issues: &[Issue], kind: IssueKind) -> String {
    const SHOWN: usize = 5;
    let targets: Vec<&str> = issues
        .iter()
        .filter(|i| i.kind == kind)
        .map(|i| i.target.as_str())
        .collect();
    let mut listed = targets[..targets.len().min(SHOWN)].join(", ");
    if targets.len() > SHOWN {
        listed.push_str(&format!(" and {} more", targets.len() - SHOWN));
    }
    listed
}
