use std::sync::Arc;

use super::context::StageContext;
use super::traits::Stage;
use super::types::{FailureReason, StageKind, StageReport, StageResult, StructuredPrompt};
use super::StageError;
use crate::pipeline::prompt::PromptAssembler;
use crate::pipeline::quality::{QualityScorer, ReferenceContext};
use crate::pipeline::structuring::{DocumentStructurer, InputError, ProjectContext};

// ═══════════════════════════════════════════════════════════
// validate-document
// ═══════════════════════════════════════════════════════════

/// Structures and validates the raw document. Fails the gate on malformed
/// input or an invalid document.
pub struct ValidateDocumentStage {
    structurer: Arc<DocumentStructurer>,
}

impl ValidateDocumentStage {
    pub fn new(structurer: Arc<DocumentStructurer>) -> Self {
        Self { structurer }
    }
}

impl Stage for ValidateDocumentStage {
    fn kind(&self) -> StageKind {
        StageKind::ValidateDocument
    }

    fn run(&self, ctx: &StageContext) -> Result<StageReport, StageError> {
        let request = ctx.request();

        let threshold = request.quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Ok(StageReport::fail(
                None,
                FailureReason::InputMalformed,
                InputError::ThresholdOutOfRange(threshold).to_string(),
            ));
        }

        let outcome = match self.structurer.validate(&request.document) {
            Ok(outcome) => outcome,
            Err(e) => return Ok(StageReport::fail(None, FailureReason::InputMalformed, e.to_string())),
        };

        if outcome.valid {
            return Ok(StageReport::pass(StageResult::Validated(outcome)));
        }

        let detail = invalid_document_detail(
            outcome.coverage,
            outcome.consistency,
            outcome.document.has_entities(),
        );
        Ok(StageReport::fail(
            Some(StageResult::Validated(outcome)),
            FailureReason::ThresholdNotMet,
            detail,
        ))
    }
}

fn invalid_document_detail(coverage: f64, consistency: f64, has_entities: bool) -> String {
    let mut detail = format!(
        "Document validation failed (coverage {coverage:.2}, consistency {consistency:.2})"
    );
    if !has_entities {
        detail.push_str("; no domain entities found");
    }
    detail
}

// ═══════════════════════════════════════════════════════════
// analyze-structure
// ═══════════════════════════════════════════════════════════

/// Combines the validated model with the project listing into a prompt.
pub struct AnalyzeStructureStage {
    assembler: Arc<dyn PromptAssembler>,
}

impl AnalyzeStructureStage {
    pub fn new(assembler: Arc<dyn PromptAssembler>) -> Self {
        Self { assembler }
    }
}

impl Stage for AnalyzeStructureStage {
    fn kind(&self) -> StageKind {
        StageKind::AnalyzeStructure
    }

    fn run(&self, ctx: &StageContext) -> Result<StageReport, StageError> {
        let validation = ctx
            .validation()
            .ok_or(StageError::MissingPriorResult(StageKind::ValidateDocument))?;

        let project = ProjectContext::from_listing(&ctx.request().project_files);
        let prompt = self.assembler.assemble(&validation.document, &project);
        if prompt.trim().is_empty() {
            return Err(StageError::Internal("prompt assembler produced no text".into()));
        }

        tracing::debug!(
            run_id = %ctx.run_id(),
            prompt_len = prompt.len(),
            project_files = project.structure.len(),
            "Prompt assembled"
        );

        Ok(StageReport::pass(StageResult::Structured(StructuredPrompt {
            prompt,
            project,
        })))
    }
}

// ═══════════════════════════════════════════════════════════
// score-quality
// ═══════════════════════════════════════════════════════════

/// Scores the assembled prompt and gates on the caller's threshold.
pub struct ScoreQualityStage {
    scorer: Arc<QualityScorer>,
}

impl ScoreQualityStage {
    pub fn new(scorer: Arc<QualityScorer>) -> Self {
        Self { scorer }
    }
}

impl Stage for ScoreQualityStage {
    fn kind(&self) -> StageKind {
        StageKind::ScoreQuality
    }

    fn run(&self, ctx: &StageContext) -> Result<StageReport, StageError> {
        let structured = ctx
            .structured()
            .ok_or(StageError::MissingPriorResult(StageKind::AnalyzeStructure))?;

        let reference = match (&ctx.request().reference, ctx.validation()) {
            (Some(reference), _) => reference.clone(),
            (None, Some(validation)) => ReferenceContext::from(&validation.document),
            (None, None) => ReferenceContext::default(),
        };

        let threshold = ctx.request().quality_threshold;
        let outcome = self.scorer.score(&structured.prompt, &reference, threshold);

        if outcome.passed {
            return Ok(StageReport::pass(StageResult::Scored(outcome)));
        }

        let detail = format!(
            "Quality score {:.2} below threshold {:.2}",
            outcome.overall, threshold
        );
        Ok(StageReport::fail(
            Some(StageResult::Scored(outcome)),
            FailureReason::ThresholdNotMet,
            detail,
        ))
    }
}
