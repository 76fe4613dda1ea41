use super::similarity::jaccard;
use super::types::{Section, SectionType};
use crate::config::StructuringConfig;

/// Collapses overlapping extractor output into one canonical section per
/// type, keeping dissimilar same-typed sections as titled alternates.
#[derive(Debug, Clone)]
pub struct SectionReconciler {
    merge_similarity: f64,
}

impl Default for SectionReconciler {
    fn default() -> Self {
        Self::new(StructuringConfig::default().merge_similarity)
    }
}

impl SectionReconciler {
    pub fn new(merge_similarity: f64) -> Self {
        Self { merge_similarity }
    }

    /// Group by type in first-seen order. A new section merges into the first
    /// same-typed entry whose content overlap exceeds the threshold; otherwise
    /// it is kept as an alternate. Nothing is discarded.
    pub fn merge(&self, sections: Vec<Section>) -> Vec<Section> {
        let mut groups: Vec<(SectionType, Vec<Section>)> = Vec::new();
        let mut merged = 0usize;
        let mut alternates = 0usize;

        for mut section in sections {
            let Some(idx) = groups
                .iter()
                .position(|(t, _)| *t == section.section_type)
            else {
                groups.push((section.section_type, vec![section]));
                continue;
            };
            let entries = &mut groups[idx].1;

            match entries
                .iter_mut()
                .find(|e| jaccard(&e.content, &section.content) > self.merge_similarity)
            {
                Some(existing) => {
                    absorb(existing, section);
                    merged += 1;
                }
                None => {
                    section.title = alternate_title(&section.title, entries.len());
                    entries.push(section);
                    alternates += 1;
                }
            }
        }

        tracing::debug!(
            types = groups.len(),
            merged,
            alternates,
            "Sections reconciled"
        );

        groups.into_iter().flat_map(|(_, entries)| entries).collect()
    }
}

/// Fold `incoming` into `existing`: content appended, longer title kept
/// (incoming wins ties), confidence maxed, entities unioned.
fn absorb(existing: &mut Section, incoming: Section) {
    if incoming.title.chars().count() >= existing.title.chars().count() {
        existing.title = incoming.title;
    }
    existing.content.push_str("\n\n");
    existing.content.push_str(&incoming.content);
    existing.confidence = existing.confidence.max(incoming.confidence);
    existing.entities.extend(incoming.entities);
}

/// `existing` counts the entries already held for the type, primary included.
fn alternate_title(title: &str, existing: usize) -> String {
    if existing <= 1 {
        format!("{title} (Alternative)")
    } else {
        format!("{title} (Alternative {existing})")
    }
}
