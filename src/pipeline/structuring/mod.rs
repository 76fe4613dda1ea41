pub mod types;
pub mod sanitize;
pub mod similarity;
pub mod classify;
pub mod entities;
pub mod extractor;
pub mod reconcile;
pub mod validation;
pub mod project;
pub mod orchestrator;

pub use types::*;
pub use sanitize::*;
pub use similarity::*;
pub use classify::*;
pub use entities::*;
pub use extractor::*;
pub use reconcile::*;
pub use validation::*;
pub use project::*;
pub use orchestrator::*;

use thiserror::Error;

/// Caller-supplied input that cannot be processed. Reported as a business
/// outcome, never as a fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Document text is empty or whitespace-only")]
    EmptyDocument,

    #[error("Quality threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("Malformed reference context: {0}")]
    MalformedReference(String),
}

/// Failure building a catalog or rule table from caller vocabulary.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Catalog '{0}' has no entries")]
    Empty(String),

    #[error("Weights sum to {0}, expected 1.0")]
    WeightSum(f64),

    #[error("Section type '{0}' cannot be registered")]
    InvalidType(SectionType),

    #[error("Pattern '{0}' lacks its value capture groups")]
    MissingCaptures(String),
}
