use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::rules::{count_present, count_words_present, percent, ratio, QualityRules};
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

const PRACTICE_WEIGHT: f64 = 0.4;
const STRUCTURE_WEIGHT: f64 = 0.3;
const ACTIONABLE_WEIGHT: f64 = 0.3;
const PROBLEMATIC_PENALTY: f64 = 0.7;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#+\s+").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*]\s+").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```|`[^`]+`").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.").unwrap());

/// Fitness of the artifact for a downstream code-generation consumer.
pub struct CompatibilityCheck {
    rules: Arc<QualityRules>,
}

impl CompatibilityCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }
}

impl QualityCheck for CompatibilityCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::Compatibility
    }

    fn evaluate(&self, artifact: &str, _reference: &ReferenceContext) -> QualityMetricResult {
        let phrases = self.rules.phrases();
        let mut details = Vec::new();
        let mut suggestions = Vec::new();

        let practices = count_present(&phrases.good_practices, artifact);
        let practice = ratio(practices, phrases.good_practices.len());
        details.push(format!("Good practices found: {practices}"));

        let structure = structure_score(artifact);
        details.push(format!("Structure score: {}", percent(structure)));

        let actionable = actionable_score(&self.rules, artifact);
        details.push(format!("Actionable instructions: {}", percent(actionable)));

        let mut score = practice * PRACTICE_WEIGHT
            + structure * STRUCTURE_WEIGHT
            + actionable * ACTIONABLE_WEIGHT;

        let problematic = count_present(&phrases.problematic, artifact);
        if problematic > 0 {
            score *= PROBLEMATIC_PENALTY;
            details.push(format!("Problematic patterns found: {problematic}"));
            suggestions.push("Remove vague or problematic instruction patterns".into());
        }

        if practice < 0.7 {
            suggestions.push("Include more implementation best practices".into());
        }
        if structure < 0.8 {
            suggestions.push("Improve prompt structure and organization".into());
        }
        if actionable < 0.8 {
            suggestions.push("Make instructions more specific and actionable".into());
        }

        QualityMetricResult {
            metric: QualityMetric::Compatibility,
            score: score.clamp(0.0, 1.0),
            detail: details.join("; "),
            suggestions,
        }
    }
}

/// Additive structure score: headings, bullets, code, numbered items. Capped at 1.0.
pub fn structure_score(artifact: &str) -> f64 {
    let mut score = 0.0;
    if HEADING.find_iter(artifact).count() >= 3 {
        score += 0.3;
    }
    if BULLET.find_iter(artifact).count() >= 3 {
        score += 0.2;
    }
    if CODE.is_match(artifact) {
        score += 0.2;
    }
    if NUMBERED.find_iter(artifact).count() >= 3 {
        score += 0.3;
    }
    f64::min(score, 1.0)
}

/// Imperative verbs, named deliverables and constraint phrasing, each capped
/// at its share of the total.
pub fn actionable_score(rules: &QualityRules, artifact: &str) -> f64 {
    let phrases = rules.phrases();
    let lowered = artifact.to_lowercase();

    let verbs = count_words_present(&phrases.imperative_verbs, &lowered);
    let deliverables = count_present(&phrases.named_deliverables, artifact);
    let constraints = count_words_present(&phrases.constraint_indicators, &lowered);

    f64::min(verbs as f64 / 5.0, 0.4)
        + f64::min(deliverables as f64 / 3.0, 0.3)
        + f64::min(constraints as f64 / 2.0, 0.3)
}
