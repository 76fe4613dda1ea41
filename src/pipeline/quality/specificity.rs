use std::sync::Arc;

use super::rules::{count_matches, count_words_present, ratio, QualityRules};
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

const EXPECTED_DETAILS: usize = 20;
const EXPECTED_EXAMPLES: usize = 3;

const DETAIL_WEIGHT: f64 = 0.5;
const GUIDANCE_WEIGHT: f64 = 0.3;
const EXAMPLE_WEIGHT: f64 = 0.2;

/// Density of concrete technical detail, implementation vocabulary and examples.
pub struct SpecificityCheck {
    rules: Arc<QualityRules>,
}

impl SpecificityCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }
}

impl QualityCheck for SpecificityCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::Specificity
    }

    fn evaluate(&self, artifact: &str, _reference: &ReferenceContext) -> QualityMetricResult {
        let phrases = self.rules.phrases();
        let mut suggestions = Vec::new();

        let detail_count = self.rules.technical_detail_count(artifact);
        let detail = ratio(detail_count, EXPECTED_DETAILS);

        let guidance_count =
            count_words_present(&phrases.implementation_words, &artifact.to_lowercase());
        let guidance = ratio(guidance_count, phrases.implementation_words.len());

        let example_count = count_matches(&phrases.example_markers, artifact);
        let examples = ratio(example_count, EXPECTED_EXAMPLES);

        let score =
            detail * DETAIL_WEIGHT + guidance * GUIDANCE_WEIGHT + examples * EXAMPLE_WEIGHT;

        if detail < 0.6 {
            suggestions.push("Include more specific technical details".into());
        }
        if guidance < 0.5 {
            suggestions.push("Provide more specific implementation guidance".into());
        }
        if examples < 0.3 {
            suggestions.push("Add concrete examples to illustrate requirements".into());
        }

        QualityMetricResult {
            metric: QualityMetric::Specificity,
            score: score.clamp(0.0, 1.0),
            detail: format!(
                "Technical details found: {detail_count}; \
                 Implementation guidance: {guidance_count}; \
                 Examples provided: {example_count}"
            ),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(text: &str) -> QualityMetricResult {
        SpecificityCheck::new(QualityRules::standard()).evaluate(text, &ReferenceContext::default())
    }

    #[test]
    fn empty_of_detail_scores_zero() {
        let result = evaluate("nothing concrete here");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn implementation_vocabulary_counts_once_per_word() {
        // function and return, each counted once: 2/6 of the guidance share
        let result = evaluate("function function return");
        assert!((result.score - 0.3 * 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn example_markers_saturate_at_three() {
        let result = evaluate("for example, such as x, for instance y, example z");
        assert!((result.score - 0.2).abs() < 1e-9);
        assert!(!result
            .suggestions
            .contains(&"Add concrete examples to illustrate requirements".to_string()));
    }

    #[test]
    fn technical_details_use_rule_tables() {
        // AMF keyword, 5 ms unit: 2 of 20 expected
        let result = evaluate("AMF within 5 ms");
        assert!((result.score - 0.5 * 2.0 / 20.0).abs() < 1e-9);
        assert!(result.detail.starts_with("Technical details found: 2"));
    }
}
