//! Seam between the orchestrator and individual stages.

use super::context::StageContext;
use super::types::{StageKind, StageReport};
use super::StageError;

/// One step of the pipeline.
///
/// A stage reads earlier results from the context and returns its own; it
/// never writes the context. Business failures are reported through
/// `StageReport::gate`, faults through `Err`.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn run(&self, ctx: &StageContext) -> Result<StageReport, StageError>;
}
