use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::classify::SectionCatalog;
use super::entities::EntityExtractor;
use super::types::{
    ConsistencyReport, CoverageReport, DocumentModel, SectionType, ValidationOutcome,
};
use super::CatalogError;
use crate::config::ValidityConfig;

/// Recommendation trigger points. Independent of the validity gate.
pub mod thresholds {
    /// Completeness below this suggests adding technical detail.
    pub const COMPLETENESS_ADVICE: f64 = 0.8;

    /// Consistency below this suggests reviewing contradictions.
    pub const CONSISTENCY_ADVICE: f64 = 0.8;

    /// Fewer reconciled sections than this suggests clearer headers.
    pub const MIN_SECTIONS_ADVICE: usize = 5;

    /// Per entity class found, capped at `ENTITY_BONUS_CAP`.
    pub const ENTITY_BONUS_PER_CLASS: f64 = 0.02;
    pub const ENTITY_BONUS_CAP: f64 = 0.1;

    /// Per reconciled section, capped at `SECTION_BONUS_CAP`.
    pub const SECTION_BONUS_PER_SECTION: f64 = 0.01;
    pub const SECTION_BONUS_CAP: f64 = 0.1;
}

/// Entity class whose hits are tallied per section for band analysis.
pub const FREQUENCY_BAND_CLASS: &str = "frequency_bands";

/// Two claims that contradict each other when both appear in one section.
#[derive(Debug)]
pub struct ContradictionPair {
    pub first: String,
    pub second: String,
    first_pattern: Regex,
    second_pattern: Regex,
    /// `second` occurs inside `first` ("supported" inside "not supported"),
    /// so it only counts when it occurs more often than `first`.
    second_within_first: bool,
}

impl ContradictionPair {
    pub fn new(first: &str, second: &str) -> Result<Self, CatalogError> {
        let first_pattern = phrase_pattern(first)?;
        let second_pattern = phrase_pattern(second)?;
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
            second_within_first: second_pattern.is_match(first),
            first_pattern,
            second_pattern,
        })
    }

    pub fn co_occurs(&self, content: &str) -> bool {
        let first = self.first_pattern.find_iter(content).count();
        if first == 0 {
            return false;
        }
        let second = self.second_pattern.find_iter(content).count();
        if self.second_within_first {
            second > first
        } else {
            second > 0
        }
    }

    fn description(&self) -> String {
        format!("'{}' and '{}'", self.first, self.second)
    }
}

/// Whole-word, case-insensitive match of a phrase with flexible spacing.
fn phrase_pattern(phrase: &str) -> Result<Regex, CatalogError> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(CatalogError::Empty("contradiction phrase".into()));
    }
    Ok(Regex::new(&format!(r"(?i)\b{}\b", words.join(r"\s+")))?)
}

/// Claim pairs the consistency check looks for within each section.
///
/// Immutable once built; an empty set disables contradiction detection.
#[derive(Debug)]
pub struct ValidityRules {
    contradictions: Vec<ContradictionPair>,
}

static STANDARD_VALIDITY_RULES: LazyLock<Arc<ValidityRules>> = LazyLock::new(|| {
    let rules = ValidityRules::new(&[
        ("not supported", "supported"),
        ("mandatory", "optional"),
        ("synchronous", "asynchronous"),
    ])
    .expect("built-in validity rules must be valid");
    Arc::new(rules)
});

impl ValidityRules {
    pub fn new(pairs: &[(&str, &str)]) -> Result<Self, CatalogError> {
        let contradictions = pairs
            .iter()
            .map(|(first, second)| ContradictionPair::new(first, second))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { contradictions })
    }

    /// The built-in contradiction pairs, shared process-wide.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_VALIDITY_RULES)
    }

    pub fn contradictions(&self) -> &[ContradictionPair] {
        &self.contradictions
    }
}

/// Coverage, consistency and validity over a reconciled document.
#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    catalog: Arc<SectionCatalog>,
    entities: EntityExtractor,
    rules: Arc<ValidityRules>,
    config: ValidityConfig,
}

impl Default for DocumentAnalyzer {
    fn default() -> Self {
        Self::new(
            SectionCatalog::standard(),
            EntityExtractor::default(),
            ValidityRules::standard(),
            ValidityConfig::default(),
        )
    }
}

impl DocumentAnalyzer {
    pub fn new(
        catalog: Arc<SectionCatalog>,
        entities: EntityExtractor,
        rules: Arc<ValidityRules>,
        config: ValidityConfig,
    ) -> Self {
        Self {
            catalog,
            entities,
            rules,
            config,
        }
    }

    /// `1 - Σ weight(missing)` over the catalog's required types.
    pub fn coverage(&self, model: &DocumentModel) -> CoverageReport {
        let found: BTreeSet<SectionType> =
            model.sections.iter().map(|s| s.section_type).collect();

        let (present, missing): (Vec<_>, Vec<_>) = self
            .catalog
            .rules()
            .iter()
            .map(|r| r.section_type)
            .partition(|t| found.contains(t));

        let missing_weight: f64 = missing.iter().map(|t| self.catalog.weight(*t)).sum();

        CoverageReport {
            score: (1.0 - missing_weight).clamp(0.0, 1.0),
            present,
            missing,
        }
    }

    /// One inconsistency per contradiction pair co-occurring in a section.
    pub fn consistency(&self, model: &DocumentModel) -> ConsistencyReport {
        let mut inconsistencies = Vec::new();
        let mut band_mentions: BTreeMap<String, usize> = BTreeMap::new();

        for section in &model.sections {
            for pair in self.rules.contradictions() {
                if pair.co_occurs(&section.content) {
                    inconsistencies.push(format!(
                        "Potential contradiction in section '{}': {}",
                        section.title,
                        pair.description()
                    ));
                }
            }

            let found = self.entities.extract(&section.content);
            if let Some(bands) = found.get(FREQUENCY_BAND_CLASS) {
                for band in bands {
                    *band_mentions.entry(band.clone()).or_default() += 1;
                }
            }
        }

        let penalty = self.config.contradiction_penalty * inconsistencies.len() as f64;
        ConsistencyReport {
            score: (1.0 - penalty).max(0.0),
            inconsistencies,
            band_mentions,
        }
    }

    /// Coverage plus capped bonuses for entity classes and section count.
    pub fn completeness(&self, coverage: f64, model: &DocumentModel) -> f64 {
        let classes = model.entities.values().filter(|v| !v.is_empty()).count();
        let entity_bonus =
            (classes as f64 * thresholds::ENTITY_BONUS_PER_CLASS).min(thresholds::ENTITY_BONUS_CAP);
        let section_bonus = (model.sections.len() as f64 * thresholds::SECTION_BONUS_PER_SECTION)
            .min(thresholds::SECTION_BONUS_CAP);
        (coverage + entity_bonus + section_bonus).min(1.0)
    }

    /// Coverage, consistency and entity presence must all hold.
    pub fn is_valid(&self, coverage: f64, consistency: f64, model: &DocumentModel) -> bool {
        coverage >= self.config.min_coverage
            && consistency >= self.config.min_consistency
            && model.has_entities()
    }

    pub fn analyze(&self, document: DocumentModel) -> ValidationOutcome {
        let coverage = self.coverage(&document);
        let consistency = self.consistency(&document);
        let completeness = self.completeness(coverage.score, &document);
        let valid = self.is_valid(coverage.score, consistency.score, &document);

        let recommendations = recommendations(
            &coverage.missing,
            completeness,
            consistency.score,
            document.sections.len(),
        );

        if !valid {
            tracing::info!(
                coverage = coverage.score,
                consistency = consistency.score,
                entity_classes = document.stats.entity_count,
                "Document failed validity checks"
            );
        }

        ValidationOutcome {
            valid,
            coverage: coverage.score,
            completeness,
            consistency: consistency.score,
            missing_section_types: coverage.missing.into_iter().collect(),
            inconsistencies: consistency.inconsistencies,
            band_mentions: consistency.band_mentions,
            recommendations,
            document,
        }
    }
}

/// Improvement advice for a validated document, most structural first.
pub fn recommendations(
    missing: &[SectionType],
    completeness: f64,
    consistency: f64,
    section_count: usize,
) -> Vec<String> {
    let mut advice = Vec::new();

    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(SectionType::as_str).collect();
        advice.push(format!("Add missing sections: {}", names.join(", ")));
    }
    if completeness < thresholds::COMPLETENESS_ADVICE {
        advice.push("Consider adding more detailed technical specifications".to_string());
    }
    if consistency < thresholds::CONSISTENCY_ADVICE {
        advice.push("Review and resolve potential inconsistencies in the document".to_string());
    }
    if section_count < thresholds::MIN_SECTIONS_ADVICE {
        advice.push("Consider structuring the document with clearer section headers".to_string());
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::{DocumentStats, EntityMap, Section};

    fn section(title: &str, content: &str, section_type: SectionType) -> Section {
        Section {
            title: title.into(),
            content: content.into(),
            section_type,
            confidence: 0.8,
            entities: BTreeSet::new(),
        }
    }

    fn model(sections: Vec<Section>, entities: EntityMap) -> DocumentModel {
        let stats = DocumentStats {
            length: 0,
            section_count: sections.len(),
            entity_count: entities.len(),
        };
        DocumentModel {
            sections,
            entities,
            stats,
        }
    }

    fn some_entities() -> EntityMap {
        let mut entities = EntityMap::new();
        entities.insert("network_functions".into(), vec!["AMF".into()]);
        entities
    }

    fn all_required() -> Vec<Section> {
        SectionType::REQUIRED
            .iter()
            .map(|t| section(t.label(), "body", *t))
            .collect()
    }

    #[test]
    fn coverage_of_requirements_only() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![section("Requirements", "x", SectionType::Requirements)],
            EntityMap::new(),
        );
        let report = analyzer.coverage(&doc);
        assert!((report.score - 0.25).abs() < 1e-9);
        assert_eq!(report.present, vec![SectionType::Requirements]);
        assert_eq!(report.missing.len(), 5);
    }

    #[test]
    fn coverage_full_and_empty() {
        let analyzer = DocumentAnalyzer::default();
        let full = analyzer.coverage(&model(all_required(), EntityMap::new()));
        assert!((full.score - 1.0).abs() < 1e-9);
        assert!(full.missing.is_empty());

        let empty = analyzer.coverage(&model(vec![], EntityMap::new()));
        assert!(empty.score.abs() < 1e-9);
    }

    #[test]
    fn general_sections_do_not_cover() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(vec![section("Misc", "x", SectionType::General)], EntityMap::new());
        assert!(analyzer.coverage(&doc).score.abs() < 1e-9);
    }

    #[test]
    fn coverage_is_monotonic() {
        let analyzer = DocumentAnalyzer::default();
        let mut sections = vec![];
        let mut last = analyzer.coverage(&model(sections.clone(), EntityMap::new())).score;
        for t in SectionType::REQUIRED {
            sections.push(section(t.label(), "body", t));
            let next = analyzer.coverage(&model(sections.clone(), EntityMap::new())).score;
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn detects_each_contradiction_pair() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![
                section("A", "Roaming is supported. Handover is not supported.", SectionType::General),
                section("B", "Field X is mandatory; field Y is optional.", SectionType::General),
                section("C", "Synchronous calls and asynchronous events.", SectionType::General),
            ],
            EntityMap::new(),
        );
        let report = analyzer.consistency(&doc);
        assert_eq!(report.inconsistencies.len(), 3);
        assert!(report.inconsistencies[0].starts_with("Potential contradiction in section 'A'"));
        assert!((report.score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn lone_negation_is_not_a_contradiction() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![section("A", "IPv4 is not supported.", SectionType::General)],
            EntityMap::new(),
        );
        assert!(analyzer.consistency(&doc).inconsistencies.is_empty());
    }

    #[test]
    fn asynchronous_alone_is_consistent() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![section("A", "All events are asynchronous.", SectionType::General)],
            EntityMap::new(),
        );
        assert!((analyzer.consistency(&doc).score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn consistency_floors_at_zero() {
        let analyzer = DocumentAnalyzer::default();
        let sections: Vec<Section> = (0..12)
            .map(|i| section(&format!("S{i}"), "mandatory or optional", SectionType::General))
            .collect();
        let report = analyzer.consistency(&model(sections, EntityMap::new()));
        assert_eq!(report.inconsistencies.len(), 12);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn band_mentions_counted_per_section() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![
                section("A", "FR1 and FR1 again, n78", SectionType::General),
                section("B", "fr1 only", SectionType::General),
            ],
            EntityMap::new(),
        );
        let report = analyzer.consistency(&doc);
        assert_eq!(report.band_mentions["FR1"], 2);
        assert_eq!(report.band_mentions["n78"], 1);
    }

    #[test]
    fn completeness_adds_capped_bonuses() {
        let analyzer = DocumentAnalyzer::default();
        let doc = model(
            vec![section("Requirements", "x", SectionType::Requirements)],
            some_entities(),
        );
        // 0.25 + 1 class * 0.02 + 1 section * 0.01
        assert!((analyzer.completeness(0.25, &doc) - 0.28).abs() < 1e-9);
        assert!((analyzer.completeness(0.95, &doc) - 0.98).abs() < 1e-9);
        assert!((analyzer.completeness(1.0, &doc) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn valid_requires_all_three_conditions() {
        let analyzer = DocumentAnalyzer::default();
        let outcome = analyzer.analyze(model(all_required(), some_entities()));
        assert!(outcome.valid);

        let outcome = analyzer.analyze(model(all_required(), EntityMap::new()));
        assert!(!outcome.valid);

        let mut contradictory = all_required();
        for s in &mut contradictory {
            s.content = "mandatory optional synchronous asynchronous".into();
        }
        let outcome = analyzer.analyze(model(contradictory, some_entities()));
        assert!(!outcome.valid);
        assert!(outcome.consistency < 0.7);
    }

    #[test]
    fn empty_document_is_invalid() {
        let outcome = DocumentAnalyzer::default().analyze(model(vec![], EntityMap::new()));
        assert!(!outcome.valid);
        assert_eq!(outcome.missing_section_types.len(), 6);
        assert!((outcome.consistency - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recommendations_cover_each_trigger() {
        let advice = recommendations(&[SectionType::Security], 0.5, 0.5, 2);
        assert_eq!(advice.len(), 4);
        assert_eq!(advice[0], "Add missing sections: security");

        let none = recommendations(&[], 0.9, 1.0, 6);
        assert!(none.is_empty());
    }

    #[test]
    fn custom_validity_config() {
        let analyzer = DocumentAnalyzer::new(
            SectionCatalog::standard(),
            EntityExtractor::default(),
            ValidityRules::standard(),
            ValidityConfig {
                min_coverage: 0.2,
                ..ValidityConfig::default()
            },
        );
        let doc = model(
            vec![section("Requirements", "x", SectionType::Requirements)],
            some_entities(),
        );
        assert!(analyzer.analyze(doc).valid);
    }

    #[test]
    fn substituted_contradiction_pairs() {
        let rules = ValidityRules::new(&[("stateless", "stateful")]).unwrap();
        let analyzer = DocumentAnalyzer::new(
            SectionCatalog::standard(),
            EntityExtractor::default(),
            Arc::new(rules),
            ValidityConfig::default(),
        );
        let doc = model(
            vec![
                section("A", "The SMF is stateless but keeps stateful timers.", SectionType::General),
                section("B", "Field X is mandatory; field Y is optional.", SectionType::General),
            ],
            EntityMap::new(),
        );
        let report = analyzer.consistency(&doc);
        assert_eq!(
            report.inconsistencies,
            vec!["Potential contradiction in section 'A': 'stateless' and 'stateful'"]
        );
    }

    #[test]
    fn nested_phrase_pairs_detected_automatically() {
        let rules = ValidityRules::standard();
        let negation = &rules.contradictions()[0];
        assert!(!negation.co_occurs("IPv4 is not supported."));
        assert!(negation.co_occurs("IPv6 is supported; IPv4 is NOT   supported."));
        assert!(matches!(
            ValidityRules::new(&[("  ", "x")]),
            Err(CatalogError::Empty(_))
        ));
    }
}
