pub mod structuring; // Document → validated section model
pub mod quality; // Weighted prompt quality metrics
pub mod prompt; // Model → prompt assembly seam
pub mod orchestrator; // validate-document → analyze-structure → score-quality
