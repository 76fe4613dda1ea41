use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified type of a document section.
///
/// Declaration order is significant: the six required types come first, in
/// the order the classifier breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    SystemOverview,
    Requirements,
    Interfaces,
    Performance,
    Security,
    Implementation,
    General,
}

impl SectionType {
    /// The six types every complete document is expected to cover.
    pub const REQUIRED: [SectionType; 6] = [
        SectionType::SystemOverview,
        SectionType::Requirements,
        SectionType::Interfaces,
        SectionType::Performance,
        SectionType::Security,
        SectionType::Implementation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemOverview => "system_overview",
            Self::Requirements => "requirements",
            Self::Interfaces => "interfaces",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Implementation => "implementation",
            Self::General => "general",
        }
    }

    /// Human-readable label ("System Overview").
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemOverview => "System Overview",
            Self::Requirements => "Requirements",
            Self::Interfaces => "Interfaces",
            Self::Performance => "Performance",
            Self::Security => "Security",
            Self::Implementation => "Implementation",
            Self::General => "General",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled, typed span of document text.
///
/// Content only grows through merging, and confidence never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub confidence: f64,
    pub entities: BTreeSet<String>,
}

/// Domain entities found in a text, keyed by entity class.
/// Only classes with at least one hit are present.
pub type EntityMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Normalized document length in characters.
    pub length: usize,
    pub section_count: usize,
    /// Number of entity classes with at least one hit.
    pub entity_count: usize,
}

/// Reconciled structure of one document. Owned by a single validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub sections: Vec<Section>,
    pub entities: EntityMap,
    pub stats: DocumentStats,
}

impl DocumentModel {
    /// Sections of the given type, in reconciled order.
    pub fn sections_of(&self, section_type: SectionType) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(move |s| s.section_type == section_type)
    }

    pub fn has_entities(&self) -> bool {
        self.entities.values().any(|found| !found.is_empty())
    }
}

/// Weighted coverage of the required section types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub score: f64,
    pub present: Vec<SectionType>,
    pub missing: Vec<SectionType>,
}

/// Contradiction scan over the reconciled sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub score: f64,
    pub inconsistencies: Vec<String>,
    /// Mentions of each frequency-band label, counted once per section.
    pub band_mentions: BTreeMap<String, usize>,
}

/// Result of validating one document. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    /// Weighted share of required section types present.
    pub coverage: f64,
    /// Coverage plus small bonuses for entity classes and section count.
    pub completeness: f64,
    pub consistency: f64,
    pub missing_section_types: BTreeSet<SectionType>,
    pub inconsistencies: Vec<String>,
    pub band_mentions: BTreeMap<String, usize>,
    pub recommendations: Vec<String>,
    pub document: DocumentModel,
}
