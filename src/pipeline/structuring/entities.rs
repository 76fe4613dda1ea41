use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::types::EntityMap;
use super::CatalogError;

/// One literal domain token and its word-bounded, case-insensitive matcher.
#[derive(Debug)]
struct CatalogEntry {
    token: String,
    pattern: Regex,
}

/// Entity class name plus its ordered tokens.
#[derive(Debug)]
struct EntityClass {
    name: String,
    entries: Vec<CatalogEntry>,
}

/// Process-wide vocabulary of domain entities, grouped by class.
///
/// Immutable after construction; safe for unsynchronized concurrent reads.
#[derive(Debug)]
pub struct EntityCatalog {
    classes: Vec<EntityClass>,
}

static STANDARD_ENTITIES: LazyLock<Arc<EntityCatalog>> = LazyLock::new(|| {
    let catalog = EntityCatalog::new(vec![
        class(
            "network_functions",
            &["AMF", "SMF", "UPF", "PCF", "AUSF", "UDM", "NRF", "NSSF"],
        ),
        class(
            "interfaces",
            &["N1", "N2", "N3", "N4", "N6", "N8", "N11", "N15", "N22", "Xn", "F1"],
        ),
        class(
            "protocols",
            &["NAS", "NGAP", "PFCP", "HTTP/2", "SBI", "SCTP", "GTP"],
        ),
        class(
            "frequency_bands",
            &["FR1", "FR2", "sub6", "mmWave", "n1", "n3", "n7", "n28", "n78"],
        ),
        class(
            "technologies",
            &["5G NR", "LTE", "NSA", "SA", "MIMO", "beamforming", "carrier aggregation"],
        ),
    ])
    .expect("built-in entity catalog must be valid");
    Arc::new(catalog)
});

fn class(name: &str, tokens: &[&str]) -> (String, Vec<String>) {
    (
        name.to_string(),
        tokens.iter().map(|t| t.to_string()).collect(),
    )
}

impl EntityCatalog {
    /// Build a catalog from `(class, tokens)` pairs. Token order is kept.
    pub fn new(classes: Vec<(String, Vec<String>)>) -> Result<Self, CatalogError> {
        if classes.is_empty() {
            return Err(CatalogError::Empty("entities".into()));
        }

        let mut compiled = Vec::with_capacity(classes.len());
        for (name, tokens) in classes {
            if tokens.is_empty() {
                return Err(CatalogError::Empty(name));
            }
            let entries = tokens
                .into_iter()
                .map(|token| -> Result<CatalogEntry, CatalogError> {
                    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&token)))?;
                    Ok(CatalogEntry { token, pattern })
                })
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push(EntityClass { name, entries });
        }

        Ok(Self { classes: compiled })
    }

    /// The built-in 5G vocabulary, shared process-wide.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_ENTITIES)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Catalog tokens of one class, in declaration order.
    pub fn tokens(&self, class: &str) -> Vec<&str> {
        self.classes
            .iter()
            .find(|c| c.name == class)
            .map(|c| c.entries.iter().map(|e| e.token.as_str()).collect())
            .unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════
// Free-form term patterns (per-section entities)
// ═══════════════════════════════════════════════════════════

static TERM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Acronyms
        Regex::new(r"\b[A-Z][A-Z0-9]{2,}\b").unwrap(),
        // Measurements
        Regex::new(r"\b\d+\.?\d*\s*(?:MHz|GHz|Mbps|Gbps|ms|dB|dBm)\b").unwrap(),
        // Capitalized / CamelCase words
        Regex::new(r"\b[A-Z][a-z]+(?:[A-Z][a-z]+)*\b").unwrap(),
    ]
});

/// Scans text for catalog entities and free-form technical terms.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    catalog: Arc<EntityCatalog>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(EntityCatalog::standard())
    }
}

impl EntityExtractor {
    pub fn new(catalog: Arc<EntityCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Catalog tokens found in `text`, grouped by class.
    ///
    /// Classes with no hit are omitted. Found tokens are reported in catalog
    /// order using their catalog spelling.
    pub fn extract(&self, text: &str) -> EntityMap {
        let mut found = EntityMap::new();
        for class in &self.catalog.classes {
            let hits: Vec<String> = class
                .entries
                .iter()
                .filter(|e| e.pattern.is_match(text))
                .map(|e| e.token.clone())
                .collect();
            if !hits.is_empty() {
                found.insert(class.name.clone(), hits);
            }
        }
        found
    }

    /// Acronyms, measurements and capitalized identifiers appearing in `text`.
    pub fn extract_terms(&self, text: &str) -> BTreeSet<String> {
        TERM_PATTERNS
            .iter()
            .flat_map(|p| p.find_iter(text).map(|m| m.as_str().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_catalog_tokens_by_class() {
        let extractor = EntityExtractor::default();
        let found = extractor.extract("The AMF talks NGAP to the gNB over N2.");
        assert_eq!(found["network_functions"], vec!["AMF"]);
        assert_eq!(found["protocols"], vec!["NGAP"]);
        assert_eq!(found["interfaces"], vec!["N2"]);
        assert!(!found.contains_key("technologies"));
    }

    #[test]
    fn matching_is_case_insensitive_and_word_bounded() {
        let extractor = EntityExtractor::default();
        let found = extractor.extract("the upf anchors sessions; SMFX is not a function");
        assert_eq!(found["network_functions"], vec!["UPF"]);
    }

    #[test]
    fn reports_catalog_spelling() {
        let extractor = EntityExtractor::default();
        let found = extractor.extract("MMWAVE deployment with BEAMFORMING");
        assert_eq!(found["frequency_bands"], vec!["mmWave"]);
        assert_eq!(found["technologies"], vec!["beamforming"]);
    }

    #[test]
    fn multi_word_and_symbol_tokens() {
        let extractor = EntityExtractor::default();
        let found = extractor.extract("5G NR with carrier aggregation; SBI over HTTP/2");
        assert_eq!(found["technologies"], vec!["5G NR", "carrier aggregation"]);
        assert_eq!(found["protocols"], vec!["HTTP/2", "SBI"]);
    }

    #[test]
    fn empty_text_yields_empty_map() {
        let extractor = EntityExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("plain prose only").is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = EntityExtractor::default();
        let text = "AMF, SMF and UPF on FR1 n78 with MIMO";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn custom_catalog_substitution() {
        let catalog = EntityCatalog::new(vec![(
            "widgets".into(),
            vec!["Sprocket".into(), "Gear".into()],
        )])
        .unwrap();
        let extractor = EntityExtractor::new(Arc::new(catalog));
        let found = extractor.extract("one gear, no AMF");
        assert_eq!(found.len(), 1);
        assert_eq!(found["widgets"], vec!["Gear"]);
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(EntityCatalog::new(vec![]), Err(CatalogError::Empty(_))));
        assert!(matches!(
            EntityCatalog::new(vec![("x".into(), vec![])]),
            Err(CatalogError::Empty(_))
        ));
    }

    #[test]
    fn tokens_in_declaration_order() {
        let catalog = EntityCatalog::standard();
        assert_eq!(catalog.tokens("frequency_bands")[..2], ["FR1", "FR2"]);
        assert!(catalog.tokens("missing").is_empty());
        assert_eq!(catalog.class_names().count(), 5);
    }

    #[test]
    fn extracts_terms() {
        let extractor = EntityExtractor::default();
        let terms = extractor.extract_terms("The gNodeB uses 100 MHz and NGAP, latency 5 ms");
        assert!(terms.contains("NGAP"));
        assert!(terms.contains("100 MHz"));
        assert!(terms.contains("5 ms"));
        assert!(terms.contains("The"));
        assert!(!terms.contains("gNodeB"));
    }

    #[test]
    fn camel_case_term() {
        let extractor = EntityExtractor::default();
        let terms = extractor.extract_terms("SessionManager handles it");
        assert!(terms.contains("SessionManager"));
    }
}
