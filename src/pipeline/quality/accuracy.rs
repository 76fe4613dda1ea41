use std::sync::Arc;

use super::rules::{percent, QualityRules};
use super::traits::QualityCheck;
use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

const BASE_SCORE: f64 = 0.8;
/// Terminology factor when the artifact uses no acronyms at all.
const NEUTRAL_TERMINOLOGY: f64 = 0.5;

/// Discount applied once when any consistency issue is found.
const CONSISTENCY_DISCOUNT: f64 = 0.8;
/// Discount per implausible bandwidth or frequency magnitude.
const MAGNITUDE_DISCOUNT: f64 = 0.9;
/// Discount per implausibly low latency claim.
const LATENCY_DISCOUNT: f64 = 0.8;
/// Discount per implausibly high reliability claim.
const RELIABILITY_DISCOUNT: f64 = 0.9;

const MIN_PLAUSIBLE_LATENCY_MS: f64 = 0.1;
const MAX_PLAUSIBLE_GBPS: f64 = 100.0;
const MAX_PLAUSIBLE_GHZ: f64 = 100.0;
const MAX_PLAUSIBLE_RELIABILITY: f64 = 99.999;

/// Soundness of the artifact's technical claims.
///
/// Starts at 0.8 scaled by terminology accuracy, then each independent
/// soundness check multiplies in its own discount. The result is not clamped:
/// it can only fall from the 0.8 base, never rise past it.
pub struct TechnicalAccuracyCheck {
    rules: Arc<QualityRules>,
}

impl TechnicalAccuracyCheck {
    pub fn new(rules: Arc<QualityRules>) -> Self {
        Self { rules }
    }

    /// Share of all-caps acronyms that belong to the known vocabulary, or the
    /// neutral factor when there are none.
    pub fn terminology_score(&self, artifact: &str) -> f64 {
        let acronyms: Vec<&str> = self
            .rules
            .phrases()
            .acronym
            .find_iter(artifact)
            .map(|m| m.as_str())
            .collect();
        if acronyms.is_empty() {
            return NEUTRAL_TERMINOLOGY;
        }
        let known = acronyms
            .iter()
            .filter(|a| self.rules.is_known_term(a))
            .count();
        known as f64 / acronyms.len() as f64
    }
}

impl QualityCheck for TechnicalAccuracyCheck {
    fn metric(&self) -> QualityMetric {
        QualityMetric::TechnicalAccuracy
    }

    fn evaluate(&self, artifact: &str, _reference: &ReferenceContext) -> QualityMetricResult {
        let mut details = Vec::new();
        let mut suggestions = Vec::new();

        let terminology = self.terminology_score(artifact);
        let mut score = BASE_SCORE * terminology;
        details.push(format!("Terminology accuracy: {}", percent(terminology)));

        let consistency = consistency_issues(&self.rules, artifact);
        if !consistency.is_empty() {
            score *= CONSISTENCY_DISCOUNT;
            details.push(format!("Consistency issues found: {}", consistency.len()));
        }

        let (spec_factor, spec_issues) = specification_accuracy(&self.rules, artifact);
        score *= spec_factor;
        details.push(format!("Specification accuracy: {}", percent(spec_factor)));

        let realism = performance_realism(&self.rules, artifact);
        score *= realism;
        details.push(format!("Performance realism: {}", percent(realism)));

        if terminology < 0.9 {
            suggestions.push("Review and correct 5G technical terminology".into());
        }
        if !consistency.is_empty() {
            suggestions.push("Resolve technical consistency issues".into());
        }
        if !consistency.is_empty() || !spec_issues.is_empty() {
            suggestions.push("Address technical specification issues".into());
        }

        QualityMetricResult {
            metric: QualityMetric::TechnicalAccuracy,
            score,
            detail: details.join("; "),
            suggestions,
        }
    }
}

/// Conflicting band mentions and sub-100µs latency values.
pub fn consistency_issues(rules: &QualityRules, artifact: &str) -> Vec<String> {
    let phrases = rules.phrases();
    let mut issues = Vec::new();

    for conflict in &phrases.band_conflicts {
        if conflict.is_present(artifact) {
            issues.push(format!(
                "Conflicting frequency band mentions ({} and {})",
                conflict.first, conflict.second
            ));
        }
    }

    for caps in phrases.latency_value.captures_iter(artifact) {
        let Some(ms) = latency_in_ms(&caps[1], &caps[2]) else {
            continue;
        };
        if ms < MIN_PLAUSIBLE_LATENCY_MS {
            issues.push(format!("Potentially unrealistic latency claim: {}", &caps[0]));
        }
    }

    issues
}

/// Discount factor for implausible bandwidth and frequency magnitudes, with
/// one description per discounted value.
pub fn specification_accuracy(rules: &QualityRules, artifact: &str) -> (f64, Vec<String>) {
    let phrases = rules.phrases();
    let mut factor = 1.0;
    let mut issues = Vec::new();

    for caps in phrases.bandwidth_value.captures_iter(artifact) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };
        if caps[2].eq_ignore_ascii_case("gbps") && value > MAX_PLAUSIBLE_GBPS {
            factor *= MAGNITUDE_DISCOUNT;
            issues.push(format!("Very high bandwidth claim: {value} Gbps"));
        }
    }

    for caps in phrases.frequency_value.captures_iter(artifact) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };
        if caps[2].eq_ignore_ascii_case("ghz") && value > MAX_PLAUSIBLE_GHZ {
            factor *= MAGNITUDE_DISCOUNT;
            issues.push(format!("Very high frequency claim: {value} GHz"));
        }
    }

    (factor, issues)
}

/// Multiplicative factor for implausible latency and reliability requirements.
pub fn performance_realism(rules: &QualityRules, artifact: &str) -> f64 {
    let phrases = rules.phrases();
    let mut factor = 1.0;

    for caps in phrases.latency_claim.captures_iter(artifact) {
        if latency_in_ms(&caps[1], &caps[2]).is_some_and(|ms| ms < MIN_PLAUSIBLE_LATENCY_MS) {
            factor *= LATENCY_DISCOUNT;
        }
    }

    for caps in phrases.reliability_claim.captures_iter(artifact) {
        if caps[1]
            .parse::<f64>()
            .is_ok_and(|v| v > MAX_PLAUSIBLE_RELIABILITY)
        {
            factor *= RELIABILITY_DISCOUNT;
        }
    }

    factor
}

fn latency_in_ms(value: &str, unit: &str) -> Option<f64> {
    let value: f64 = value.parse().ok()?;
    let unit = unit.to_lowercase();
    if unit.starts_with("μ") || unit.starts_with("us") || unit.starts_with("micro") {
        Some(value / 1000.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::quality::rules::PhraseTables;

    fn rules() -> Arc<QualityRules> {
        QualityRules::standard()
    }

    fn check() -> TechnicalAccuracyCheck {
        TechnicalAccuracyCheck::new(rules())
    }

    fn score(text: &str) -> f64 {
        check().evaluate(text, &ReferenceContext::default()).score
    }

    #[test]
    fn no_acronyms_uses_neutral_factor() {
        assert!((score("a plain description of the radio site") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn known_acronyms_keep_full_base() {
        assert!((score("The AMF and SMF talk NGAP") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn unknown_acronyms_discount() {
        // AMF known, TCP and DNS unknown
        assert!((check().terminology_score("AMF over TCP with DNS") - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn conflicting_bands_flagged() {
        let issues = consistency_issues(&rules(), "Deploy on FR1 and mmWave together");
        assert_eq!(issues.len(), 1);
        assert!((score("AMF on FR1 and mmWave") - 0.8 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn sub_100_microsecond_latency_flagged() {
        assert_eq!(consistency_issues(&rules(), "target 0.05 ms").len(), 1);
        assert_eq!(consistency_issues(&rules(), "target 50 μs").len(), 1);
        assert!(consistency_issues(&rules(), "target 5 ms").is_empty());
        assert!(consistency_issues(&rules(), "target 500 us").is_empty());
    }

    #[test]
    fn country_code_is_not_a_latency_unit() {
        assert!(consistency_issues(&rules(), "Deploy the AMF to 3 US regions.").is_empty());
        assert!((score("Deploy the AMF to 3 US regions.") - score("Deploy the AMF to US regions.")).abs() < 1e-9);
        assert_eq!(consistency_issues(&rules(), "target 50 us").len(), 1);
    }

    #[test]
    fn substituted_band_conflicts() {
        let tables = PhraseTables {
            band_conflicts: vec![("n78".into(), "n258".into())],
            ..PhraseTables::default()
        };
        let rules = QualityRules::standard().with_phrases(&tables).unwrap();
        assert!(consistency_issues(&rules, "FR1 and mmWave").is_empty());
        assert_eq!(
            consistency_issues(&rules, "n78 with n258 carriers"),
            vec!["Conflicting frequency band mentions (n78 and n258)"]
        );
    }

    #[test]
    fn high_bandwidth_and_frequency_discounted_per_claim() {
        let (factor, issues) = specification_accuracy(&rules(), "links of 200 Gbps and 400 Gbps at 150 GHz");
        assert_eq!(issues.len(), 3);
        assert!((factor - 0.9_f64.powi(3)).abs() < 1e-9);

        let (factor, issues) = specification_accuracy(&rules(), "500 Mbps at 3500 MHz");
        assert!(issues.is_empty());
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn unrealistic_performance_discounted() {
        assert!((performance_realism(&rules(), "latency below 0.05 ms") - 0.8).abs() < 1e-9);
        assert!((performance_realism(&rules(), "reliability of 99.9999 %") - 0.9).abs() < 1e-9);
        assert_eq!(performance_realism(&rules(), "latency of 10 ms, reliability 99.99%"), 1.0);
    }

    #[test]
    fn discounts_compose_multiplicatively() {
        // known terms only: 0.8; latency 0.05 ms trips consistency (0.8) and realism (0.8)
        let s = score("AMF latency 0.05 ms");
        assert!((s - 0.8 * 0.8 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn suggestions_follow_findings() {
        let result = check().evaluate("TCP on FR1 and mmWave", &ReferenceContext::default());
        assert_eq!(
            result.suggestions,
            vec![
                "Review and correct 5G technical terminology",
                "Resolve technical consistency issues",
                "Address technical specification issues",
            ]
        );
    }
}
