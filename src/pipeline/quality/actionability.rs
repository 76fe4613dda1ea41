use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::rules::{count_present, count_words_present, ratio, QualityRules};
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

const EXPECTED_VERBS: usize = 5;
const EXPECTED_STEPS: usize = 5;

static NUMBERED_STEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\n)\s*\d+\.").unwrap());

/// Action verbs, concrete deliverables and numbered steps.
pub struct ActionabilityCheck {
    rules: Arc<QualityRules>,
}

impl ActionabilityCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }
}

impl QualityCheck for ActionabilityCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::Actionability
    }

    fn evaluate(&self, artifact: &str, _reference: &ReferenceContext) -> QualityMetricResult {
        let phrases = self.rules.phrases();
        let mut suggestions = Vec::new();

        let verbs = count_words_present(&phrases.action_verbs, &artifact.to_lowercase());
        let action = ratio(verbs, EXPECTED_VERBS);

        let deliverables = count_present(&phrases.deliverables, artifact);
        let deliverable = ratio(deliverables, phrases.deliverables.len());

        let steps = NUMBERED_STEP.find_iter(artifact).count();
        let step = ratio(steps, EXPECTED_STEPS);

        let score = action * 0.4 + deliverable * 0.3 + step * 0.3;

        if action < 0.6 {
            suggestions.push("Include more specific action verbs".into());
        }
        if deliverable < 0.5 {
            suggestions.push("Define clearer deliverables and outcomes".into());
        }
        if step < 0.4 {
            suggestions.push("Break down complex tasks into numbered steps".into());
        }

        QualityMetricResult {
            metric: QualityMetric::Actionability,
            score: score.clamp(0.0, 1.0),
            detail: format!(
                "Action verbs found: {verbs}; Clear deliverables: {deliverables}; \
                 Numbered steps: {steps}"
            ),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(text: &str) -> QualityMetricResult {
        ActionabilityCheck::new(QualityRules::standard())
            .evaluate(text, &ReferenceContext::default())
    }

    #[test]
    fn fully_actionable_artifact() {
        let text = "Implement a parser, create a cache, build an index, design and write it.\n\
                    The module that loads data must return errors.\n\
                    1. read\n2. parse\n3. validate\n4. store\n5. report\n";
        let result = evaluate(text);
        assert!((result.score - 1.0).abs() < 1e-9);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn numbered_steps_scale() {
        // two steps: 2/5 of the step share
        let result = evaluate("1. one\n2. two");
        assert!((result.score - 0.3 * 0.4).abs() < 1e-9);
        assert!(result.detail.ends_with("Numbered steps: 2"));
    }

    #[test]
    fn vague_text_gets_every_suggestion() {
        let result = evaluate("think about it");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.suggestions.len(), 3);
    }
}
