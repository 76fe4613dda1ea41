//! Crate-level constants and tunable thresholds.
//!
//! The threshold structs derive `Deserialize` so a host can load them from its
//! own configuration source; this crate never reads configuration files itself.

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "specgate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quality threshold applied when the caller does not supply one.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.8;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "specgate=info"
}

// ═══════════════════════════════════════════════════════════
// Structuring
// ═══════════════════════════════════════════════════════════

/// Knobs for the section extraction strategies and the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructuringConfig {
    /// Confidence assigned to header-delimited sections.
    pub header_confidence: f64,
    /// Confidence assigned to keyword-windowed sections.
    pub keyword_confidence: f64,
    /// Confidence assigned to chunk-based sections.
    pub chunk_confidence: f64,
    /// Lines of context taken on each side of a keyword hit.
    pub context_window: usize,
    /// Nominal chunk size in characters (paragraphs are packed up to this).
    pub chunk_size: usize,
    /// Chunks shorter than this (trimmed, in characters) are discarded.
    pub min_chunk_chars: usize,
    /// Jaccard similarity above which two same-typed sections are merged.
    pub merge_similarity: f64,
    /// A chunk title line must be strictly longer than this...
    pub title_min_chars: usize,
    /// ...and strictly shorter than this.
    pub title_max_chars: usize,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            header_confidence: 0.8,
            keyword_confidence: 0.6,
            chunk_confidence: 0.4,
            context_window: 3,
            chunk_size: 1000,
            min_chunk_chars: 50,
            merge_similarity: 0.7,
            title_min_chars: 10,
            title_max_chars: 100,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Validity
// ═══════════════════════════════════════════════════════════

/// Gate values for document validity. All three conditions are AND-ed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidityConfig {
    pub min_coverage: f64,
    pub min_consistency: f64,
    /// Consistency lost per detected contradiction.
    pub contradiction_penalty: f64,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            min_coverage: 0.7,
            min_consistency: 0.7,
            contradiction_penalty: 0.1,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Quality
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityConfig {
    /// Metrics scoring below this are reported as critical issues.
    pub critical_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 0.5,
        }
    }
}
