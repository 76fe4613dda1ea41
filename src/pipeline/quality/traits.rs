//! Seam between the scorer and the individual metric algorithms.

use super::types::{QualityMetric, QualityMetricResult, ReferenceContext};

/// One independently scored quality dimension.
///
/// Implementations are pure functions of the artifact text and the reference
/// context; they hold only immutable rule tables.
pub trait QualityCheck: Send + Sync {
    /// Which metric this check produces.
    fn metric(&self) -> QualityMetric;

    /// Score `artifact`, optionally against the sections it should address.
    fn evaluate(&self, artifact: &str, reference: &ReferenceContext) -> QualityMetricResult;
}
