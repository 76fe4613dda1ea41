use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::types::SectionType;
use super::CatalogError;

/// Keyword list and coverage weight for one required section type.
#[derive(Debug)]
pub struct SectionRule {
    pub section_type: SectionType,
    /// Lowercased keywords, in declaration order.
    pub keywords: Vec<String>,
    pub weight: f64,
    /// Case-insensitive union of the keywords, used by the keyword strategy.
    matcher: Regex,
}

impl SectionRule {
    /// Whether any of this rule's keywords occurs in `line`.
    pub fn matches_line(&self, line: &str) -> bool {
        self.matcher.is_match(line)
    }

    /// Literal, non-overlapping keyword occurrences in an already-lowercased blob.
    fn score(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .map(|keyword| lowered.matches(keyword.as_str()).count())
            .sum()
    }
}

/// Required section types with their keywords and coverage weights.
///
/// Immutable once built. Rule order is the classifier's tie-break order.
#[derive(Debug)]
pub struct SectionCatalog {
    rules: Vec<SectionRule>,
}

static STANDARD_CATALOG: LazyLock<Arc<SectionCatalog>> = LazyLock::new(|| {
    let catalog = SectionCatalog::new(vec![
        rule(
            SectionType::SystemOverview,
            &["system", "overview", "architecture", "topology"],
            0.20,
        ),
        rule(
            SectionType::Requirements,
            &["requirements", "specifications", "constraints"],
            0.25,
        ),
        rule(
            SectionType::Interfaces,
            &["interface", "protocol", "api", "connectivity"],
            0.20,
        ),
        rule(
            SectionType::Performance,
            &["performance", "kpi", "latency", "throughput", "capacity"],
            0.15,
        ),
        rule(
            SectionType::Security,
            &["security", "authentication", "encryption", "access"],
            0.10,
        ),
        rule(
            SectionType::Implementation,
            &["implementation", "deployment", "configuration"],
            0.10,
        ),
    ])
    .expect("built-in section catalog must be valid");
    Arc::new(catalog)
});

fn rule(section_type: SectionType, keywords: &[&str], weight: f64) -> (SectionType, Vec<String>, f64) {
    (
        section_type,
        keywords.iter().map(|k| k.to_string()).collect(),
        weight,
    )
}

impl SectionCatalog {
    /// Build a catalog from `(type, keywords, weight)` triples.
    ///
    /// Weights must sum to 1.0. `General` is the fallback type and cannot be
    /// registered, and each type may appear at most once.
    pub fn new(rules: Vec<(SectionType, Vec<String>, f64)>) -> Result<Self, CatalogError> {
        if rules.is_empty() {
            return Err(CatalogError::Empty("sections".into()));
        }

        let total: f64 = rules.iter().map(|(_, _, w)| w).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(CatalogError::WeightSum(total));
        }

        let mut compiled: Vec<SectionRule> = Vec::with_capacity(rules.len());
        for (section_type, keywords, weight) in rules {
            if section_type == SectionType::General
                || compiled.iter().any(|r| r.section_type == section_type)
            {
                return Err(CatalogError::InvalidType(section_type));
            }
            if keywords.is_empty() {
                return Err(CatalogError::Empty(section_type.as_str().into()));
            }

            let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let matcher = Regex::new(&format!("(?i)(?:{alternation})"))?;

            compiled.push(SectionRule {
                section_type,
                keywords,
                weight,
                matcher,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// The built-in catalog, shared process-wide.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_CATALOG)
    }

    pub fn rules(&self) -> &[SectionRule] {
        &self.rules
    }

    /// Coverage weight of a type, or 0.0 when the type is not registered.
    pub fn weight(&self, section_type: SectionType) -> f64 {
        self.rules
            .iter()
            .find(|r| r.section_type == section_type)
            .map_or(0.0, |r| r.weight)
    }

    /// Classify a title + content blob by literal keyword counts.
    ///
    /// Strict argmax: on a tie the earlier-registered type wins. Returns
    /// `General` when no keyword occurs at all.
    pub fn classify(&self, title: &str, content: &str) -> SectionType {
        let blob = format!("{title} {content}").to_lowercase();

        let mut best = SectionType::General;
        let mut best_score = 0;
        for rule in &self.rules {
            let score = rule.score(&blob);
            if score > best_score {
                best = rule.section_type;
                best_score = score;
            }
        }
        best
    }
}
