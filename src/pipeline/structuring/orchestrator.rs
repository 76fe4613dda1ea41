use std::sync::Arc;

use super::classify::SectionCatalog;
use super::entities::{EntityCatalog, EntityExtractor};
use super::extractor::SectionExtractor;
use super::reconcile::SectionReconciler;
use super::sanitize::normalize_document;
use super::types::{DocumentModel, DocumentStats, ValidationOutcome};
use super::validation::{DocumentAnalyzer, ValidityRules};
use super::InputError;
use crate::config::{StructuringConfig, ValidityConfig};

/// Runs the full structuring path over one document:
/// normalize → extract → reconcile → entities → analyze
///
/// Holds only immutable catalogs and thresholds, so one instance may serve
/// any number of concurrent documents.
#[derive(Debug, Clone)]
pub struct DocumentStructurer {
    extractor: SectionExtractor,
    entities: EntityExtractor,
    reconciler: SectionReconciler,
    analyzer: DocumentAnalyzer,
}

impl Default for DocumentStructurer {
    fn default() -> Self {
        Self::new(
            SectionCatalog::standard(),
            EntityCatalog::standard(),
            ValidityRules::standard(),
            StructuringConfig::default(),
            ValidityConfig::default(),
        )
    }
}

impl DocumentStructurer {
    pub fn new(
        sections: Arc<SectionCatalog>,
        entities: Arc<EntityCatalog>,
        validity_rules: Arc<ValidityRules>,
        structuring: StructuringConfig,
        validity: ValidityConfig,
    ) -> Self {
        let entities = EntityExtractor::new(entities);
        Self {
            extractor: SectionExtractor::new(
                Arc::clone(&sections),
                entities.clone(),
                structuring.clone(),
            ),
            reconciler: SectionReconciler::new(structuring.merge_similarity),
            analyzer: DocumentAnalyzer::new(sections, entities.clone(), validity_rules, validity),
            entities,
        }
    }

    /// Reconciled section model of `text`.
    pub fn structure(&self, text: &str) -> Result<DocumentModel, InputError> {
        let normalized = normalize_document(text)?;

        let candidates = self.extractor.extract(&normalized);
        let candidate_count = candidates.len();
        let sections = self.reconciler.merge(candidates);
        let entities = self.entities.extract(&normalized);

        let stats = DocumentStats {
            length: normalized.chars().count(),
            section_count: sections.len(),
            entity_count: entities.len(),
        };

        tracing::info!(
            length = stats.length,
            candidates = candidate_count,
            sections = stats.section_count,
            entity_classes = stats.entity_count,
            "Document structured"
        );

        Ok(DocumentModel {
            sections,
            entities,
            stats,
        })
    }

    /// Structure `text` and score its coverage, consistency and validity.
    pub fn validate(&self, text: &str) -> Result<ValidationOutcome, InputError> {
        let model = self.structure(text)?;
        Ok(self.analyzer.analyze(model))
    }
}

/// Validate a document with the built-in catalogs and default thresholds.
pub fn validate_document(text: &str) -> Result<ValidationOutcome, InputError> {
    DocumentStructurer::default().validate(text)
}
