use std::sync::Arc;

use super::rules::{percent, QualityRules};
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext, ReferenceSection};

/// Each section marker found in the artifact adds this much.
const MARKER_WEIGHT: f64 = 0.1;
const REFERENCE_WEIGHT: f64 = 0.4;
const DOMAIN_WEIGHT: f64 = 0.2;

/// Title words plus this many leading content words form a section's keywords.
const CONTENT_KEYWORDS: usize = 10;
/// Keywords must be longer than this many characters.
const MIN_KEYWORD_CHARS: usize = 3;
/// A section is addressed when at least this many of its keywords appear...
const MIN_SHARED_KEYWORDS: usize = 2;
/// ...and at least this percentage of them.
const MIN_SHARED_PERCENT: usize = 30;

/// Marker sections, reference coverage and domain density.
pub struct CompletenessCheck {
    rules: Arc<QualityRules>,
}

impl CompletenessCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }
}

impl QualityCheck for CompletenessCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::Completeness
    }

    fn evaluate(&self, artifact: &str, reference: &ReferenceContext) -> QualityMetricResult {
        let mut details = Vec::new();
        let mut suggestions = Vec::new();

        let (found, missing): (Vec<&str>, Vec<&str>) = self
            .rules
            .phrases()
            .section_markers
            .iter()
            .map(|marker| (marker.name.as_str(), marker.is_present(artifact)))
            .fold((Vec::new(), Vec::new()), |(mut found, mut missing), (marker, hit)| {
                if hit {
                    found.push(marker);
                } else {
                    missing.push(marker);
                }
                (found, missing)
            });
        let mut score = found.len() as f64 * MARKER_WEIGHT;
        details.push(format!("Found sections: {}", found.join(", ")));

        let coverage = reference_coverage(artifact, &reference.sections);
        score += coverage.ratio * REFERENCE_WEIGHT;
        details.push(format!(
            "Requirement coverage: {}/{} ({})",
            coverage.addressed,
            coverage.total,
            percent(coverage.ratio)
        ));

        let domain = self.rules.domain_coverage(artifact);
        score += domain * DOMAIN_WEIGHT;
        details.push(format!("Domain coverage: {}", percent(domain)));

        if !missing.is_empty() {
            suggestions.push(format!("Add missing sections: {}", missing.join(", ")));
        }
        if coverage.ratio < 0.8 {
            suggestions.push("Increase coverage of the source document's requirements".into());
        }
        if domain < 0.6 {
            suggestions.push("Include more 5G-specific technical details".into());
        }

        QualityMetricResult {
            metric: QualityMetric::Completeness,
            score: score.min(1.0),
            detail: details.join("; "),
            suggestions,
        }
    }
}

struct ReferenceCoverage {
    addressed: usize,
    total: usize,
    ratio: f64,
}

fn reference_coverage(artifact: &str, sections: &[ReferenceSection]) -> ReferenceCoverage {
    let lowered = artifact.to_lowercase();
    let addressed = sections
        .iter()
        .filter(|s| addresses_section(&lowered, s))
        .count();
    let total = sections.len();
    let ratio = if total == 0 {
        0.0
    } else {
        addressed as f64 / total as f64
    };
    ReferenceCoverage {
        addressed,
        total,
        ratio,
    }
}

/// Whether the lowercased artifact shares enough keywords with a section.
///
/// Both floors apply: at least two shared keywords and at least 30% of the
/// section's keywords.
pub fn addresses_section(lowered_artifact: &str, section: &ReferenceSection) -> bool {
    let keywords: Vec<String> = section
        .title
        .split_whitespace()
        .chain(section.content.split_whitespace().take(CONTENT_KEYWORDS))
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .collect();

    let shared = keywords
        .iter()
        .filter(|k| lowered_artifact.contains(k.as_str()))
        .count();

    shared >= MIN_SHARED_KEYWORDS && shared * 100 >= keywords.len() * MIN_SHARED_PERCENT
}
