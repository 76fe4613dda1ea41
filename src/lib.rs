pub mod config;
pub mod pipeline;

pub use pipeline::orchestrator::{Pipeline, PipelineOutcome, PipelineRequest};
pub use pipeline::quality::{QualityOutcome, QualityScorer, ReferenceContext};
pub use pipeline::structuring::{validate_document, DocumentModel, DocumentStructurer, ValidationOutcome};

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// [`config::default_log_filter`]. Leaves an existing global subscriber in
/// place; returns whether this call installed one.
pub fn init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
    installed
}
