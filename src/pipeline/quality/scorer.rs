use std::collections::HashSet;
use std::sync::Arc;

use crate::config::QualityConfig;

use super::accuracy::TechnicalAccuracyCheck;
use super::actionability::ActionabilityCheck;
use super::clarity::ClarityCheck;
use super::compatibility::CompatibilityCheck;
use super::completeness::CompletenessCheck;
use super::rules::QualityRules;
use super::specificity::SpecificityCheck;
use super::traits::QualityCheck;
use super::types::{QualityMetricResult, QualityOutcome, ReferenceContext};

/// Runs every quality check over an artifact and aggregates the verdict.
pub struct QualityScorer {
    checks: Vec<Box<dyn QualityCheck>>,
    config: QualityConfig,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::standard()
    }
}

impl QualityScorer {
    /// The six standard checks over the built-in rule tables.
    pub fn standard() -> Self {
        Self::with_rules(QualityRules::standard(), QualityConfig::default())
    }

    /// The six standard checks over substitute rule tables.
    pub fn with_rules(rules: Arc<QualityRules>, config: QualityConfig) -> Self {
        let checks: Vec<Box<dyn QualityCheck>> = vec![
            Box::new(CompletenessCheck::new(Arc::clone(&rules))),
            Box::new(TechnicalAccuracyCheck::new(Arc::clone(&rules))),
            Box::new(CompatibilityCheck::new(Arc::clone(&rules))),
            Box::new(ClarityCheck::new(Arc::clone(&rules))),
            Box::new(SpecificityCheck::new(Arc::clone(&rules))),
            Box::new(ActionabilityCheck::new(rules)),
        ];
        Self::with_checks(checks, config)
    }

    /// An arbitrary set of checks, e.g. for testing one metric in isolation.
    pub fn with_checks(checks: Vec<Box<dyn QualityCheck>>, config: QualityConfig) -> Self {
        Self { checks, config }
    }

    /// Score `artifact` against `reference`. `threshold` is compared
    /// inclusively: an overall score equal to it passes.
    pub fn score(
        &self,
        artifact: &str,
        reference: &ReferenceContext,
        threshold: f64,
    ) -> QualityOutcome {
        let metrics: Vec<QualityMetricResult> = self
            .checks
            .iter()
            .map(|check| check.evaluate(artifact, reference))
            .collect();

        let overall = overall_score(&metrics);
        let passed = overall >= threshold;
        let critical = critical_issues(&metrics, self.config.critical_threshold);
        let suggestions = merge_suggestions(&metrics);

        tracing::info!(
            overall = overall,
            threshold = threshold,
            passed = passed,
            critical = critical.len(),
            artifact_len = artifact.len(),
            "Quality scored"
        );

        QualityOutcome {
            overall,
            metrics,
            passed,
            threshold,
            critical,
            suggestions,
        }
    }
}

/// Weighted mean of the metric scores by their fixed weights, clamped to [0, 1].
///
/// Divides by the sum of weights actually present, so a partial set of checks
/// still yields a mean. No metrics at all yields 0.0.
pub fn overall_score(results: &[QualityMetricResult]) -> f64 {
    let total_weight: f64 = results.iter().map(|r| r.metric.weight()).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = results.iter().map(|r| r.score * r.metric.weight()).sum();
    (weighted / total_weight).clamp(0.0, 1.0)
}

/// One message per metric scoring below `critical_threshold`.
pub fn critical_issues(results: &[QualityMetricResult], critical_threshold: f64) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.score < critical_threshold)
        .map(|r| format!("Critical issue in {}: {}", r.metric, r.detail))
        .collect()
}

/// Every metric's suggestions, de-duplicated in first-seen order.
pub fn merge_suggestions(results: &[QualityMetricResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .flat_map(|r| r.suggestions.iter())
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}
