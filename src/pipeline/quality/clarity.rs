use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::rules::QualityRules;
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

const BASE_SCORE: f64 = 0.8;
const MAX_SENTENCE_WORDS: usize = 30;
const MIN_HEADINGS: usize = 3;
const MAX_ACRONYMS: usize = 10;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#+\s+(.+)$").unwrap());

/// Readability: sentence length, headings and acronym load.
pub struct ClarityCheck {
    rules: Arc<QualityRules>,
}

impl ClarityCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }
}

impl QualityCheck for ClarityCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::Clarity
    }

    fn evaluate(&self, artifact: &str, _reference: &ReferenceContext) -> QualityMetricResult {
        let mut score = BASE_SCORE;
        let mut details = Vec::new();
        let mut suggestions = Vec::new();

        let long_sentences = SENTENCE_END
            .split(artifact)
            .filter(|s| s.split_whitespace().count() > MAX_SENTENCE_WORDS)
            .count();
        if long_sentences > 0 {
            score *= 0.9;
            details.push(format!("Long sentences found: {long_sentences}"));
            suggestions.push("Break down long sentences for better clarity".into());
        }

        let headings = HEADING.find_iter(artifact).count();
        if headings >= MIN_HEADINGS {
            score += 0.1;
            details.push(format!("Clear headings found: {headings}"));
        } else {
            suggestions.push("Add more clear section headings".into());
        }

        let acronyms = self.rules.phrases().acronym.find_iter(artifact).count();
        if acronyms > MAX_ACRONYMS {
            score *= 0.95;
            details.push(format!("Technical acronyms: {acronyms}"));
            suggestions.push("Consider explaining technical acronyms".into());
        }

        QualityMetricResult {
            metric: QualityMetric::Clarity,
            score: score.clamp(0.0, 1.0),
            detail: details.join("; "),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::quality::rules::PhraseTables;

    fn check() -> ClarityCheck {
        ClarityCheck::new(QualityRules::standard())
    }

    fn score(text: &str) -> f64 {
        check().evaluate(text, &ReferenceContext::default()).score
    }

    #[test]
    fn base_score_for_short_unstructured_text() {
        assert!((score("Short text. Another one.") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn headings_boost() {
        assert!((score("# One\n# Two\n# Three\nBody.") - 0.9).abs() < 1e-9);
    }

    #[test]
    fn long_sentence_discount() {
        let long = "word ".repeat(31) + ".";
        assert!((score(&long) - 0.72).abs() < 1e-9);
    }

    #[test]
    fn acronym_load_discount() {
        let text = "AMF SMF UPF NAS RRC PDCP RLC MAC PHY NGAP URLLC";
        let result = check().evaluate(text, &ReferenceContext::default());
        assert!((result.score - 0.8 * 0.95).abs() < 1e-9);
        assert!(result
            .suggestions
            .contains(&"Consider explaining technical acronyms".to_string()));
    }

    #[test]
    fn acronym_pattern_comes_from_rules() {
        let tables = PhraseTables {
            acronym: r"\b[A-Z]{5,}\b".into(),
            ..PhraseTables::default()
        };
        let rules = QualityRules::standard().with_phrases(&tables).unwrap();
        let text = "AMF SMF UPF NAS RRC PDCP RLC MAC PHY NGAP URLLC";
        // only URLLC has five letters
        let result = ClarityCheck::new(Arc::new(rules)).evaluate(text, &ReferenceContext::default());
        assert!((result.score - 0.8).abs() < 1e-9);
    }
}
