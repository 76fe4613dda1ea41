pub mod types;
pub mod rules;
pub mod traits;
pub mod completeness;
pub mod accuracy;
pub mod compatibility;
pub mod clarity;
pub mod specificity;
pub mod actionability;
pub mod scorer;

pub use types::*;
pub use rules::{PhraseTables, QualityRules};
pub use traits::QualityCheck;
pub use completeness::CompletenessCheck;
pub use accuracy::TechnicalAccuracyCheck;
pub use compatibility::CompatibilityCheck;
pub use clarity::ClarityCheck;
pub use specificity::SpecificityCheck;
pub use actionability::ActionabilityCheck;
pub use scorer::*;
