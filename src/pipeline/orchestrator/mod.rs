pub mod types;
pub mod context;
pub mod traits;
pub mod stages;
pub mod runner;

pub use types::*;
pub use context::StageContext;
pub use traits::Stage;
pub use stages::*;
pub use runner::Pipeline;

use thiserror::Error;

/// Unexpected fault inside a stage. The orchestrator converts every variant
/// into an `internal_fault` outcome; none escapes a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Stage requires a '{0}' result that is not in the context")]
    MissingPriorResult(StageKind),

    #[error("Stage '{0}' already recorded a result")]
    ContextConflict(StageKind),

    #[error("Internal stage error: {0}")]
    Internal(String),

    #[error("Stage panicked: {0}")]
    Panicked(String),
}
