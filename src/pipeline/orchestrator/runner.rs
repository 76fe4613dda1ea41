use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;

use super::context::StageContext;
use super::stages::{AnalyzeStructureStage, ScoreQualityStage, ValidateDocumentStage};
use super::traits::Stage;
use super::types::{
    FailureReason, Gate, PipelineFailure, PipelineOutcome, PipelinePayload, PipelineRequest,
    RunResult, StageKind, StageReport,
};
use super::StageError;
use crate::pipeline::prompt::{MarkdownPromptAssembler, PromptAssembler};
use crate::pipeline::quality::QualityScorer;
use crate::pipeline::structuring::DocumentStructurer;

/// Fixed, ordered sequence of stages.
///
/// Holds no per-run state: every call to [`Pipeline::process`] builds its own
/// [`StageContext`], so one pipeline can serve concurrent runs.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    /// validate-document → analyze-structure → score-quality over the
    /// built-in catalogs.
    pub fn standard() -> Self {
        Self::new(
            Arc::new(DocumentStructurer::default()),
            Arc::new(MarkdownPromptAssembler),
            Arc::new(QualityScorer::standard()),
        )
    }

    pub fn new(
        structurer: Arc<DocumentStructurer>,
        assembler: Arc<dyn PromptAssembler>,
        scorer: Arc<QualityScorer>,
    ) -> Self {
        Self::with_stages(vec![
            Box::new(ValidateDocumentStage::new(structurer)),
            Box::new(AnalyzeStructureStage::new(assembler)),
            Box::new(ScoreQualityStage::new(scorer)),
        ])
    }

    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Run every stage in order, stopping at the first failed gate or fault.
    /// Never panics and never returns a partially-populated success.
    pub fn process(&self, request: PipelineRequest) -> PipelineOutcome {
        self.run(StageContext::new(request))
    }

    /// [`Pipeline::process`] on a blocking worker, one task per call.
    pub async fn process_async(self: Arc<Self>, request: PipelineRequest) -> PipelineOutcome {
        let ctx = StageContext::new(request);
        let run_id = ctx.run_id();
        let started_at = ctx.started_at();

        match tokio::task::spawn_blocking(move || self.run(ctx)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "Pipeline worker failed");
                PipelineOutcome {
                    success: false,
                    run_id,
                    started_at,
                    duration_ms: (Utc::now() - started_at).num_milliseconds(),
                    stages_completed: Vec::new(),
                    result: RunResult::Failed(PipelineFailure {
                        stage: None,
                        reason: FailureReason::InternalFault,
                        error: format!("Pipeline worker failed: {e}"),
                        partial: None,
                    }),
                }
            }
        }
    }

    fn run(&self, mut ctx: StageContext) -> PipelineOutcome {
        tracing::info!(
            run_id = %ctx.run_id(),
            stages = self.stages.len(),
            document_len = ctx.request().document.len(),
            "Pipeline started"
        );

        let mut completed = Vec::new();

        for stage in &self.stages {
            let kind = stage.kind();
            tracing::info!(run_id = %ctx.run_id(), stage = kind.as_str(), "Stage started");

            let report = match run_guarded(stage.as_ref(), &ctx) {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(
                        run_id = %ctx.run_id(),
                        stage = kind.as_str(),
                        error = %e,
                        "Stage fault"
                    );
                    return failed(&ctx, completed, kind, FailureReason::InternalFault, e.to_string());
                }
            };

            let StageReport { result, gate } = report;
            if let Some(result) = result {
                if let Err(e) = ctx.record(kind, result) {
                    tracing::error!(
                        run_id = %ctx.run_id(),
                        stage = kind.as_str(),
                        error = %e,
                        "Stage result rejected"
                    );
                    return failed(&ctx, completed, kind, FailureReason::InternalFault, e.to_string());
                }
            }

            if let Gate::Fail { reason, detail } = gate {
                tracing::warn!(
                    run_id = %ctx.run_id(),
                    stage = kind.as_str(),
                    reason = reason.as_str(),
                    detail = %detail,
                    "Stage gate failed"
                );
                return failed(&ctx, completed, kind, reason, detail);
            }

            completed.push(kind);
        }

        finish(ctx, completed)
    }
}

/// Run one stage, converting a panic into a fault.
fn run_guarded(stage: &dyn Stage, ctx: &StageContext) -> Result<StageReport, StageError> {
    match panic::catch_unwind(AssertUnwindSafe(|| stage.run(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(StageError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn failed(
    ctx: &StageContext,
    completed: Vec<StageKind>,
    stage: StageKind,
    reason: FailureReason,
    error: String,
) -> PipelineOutcome {
    PipelineOutcome {
        success: false,
        run_id: ctx.run_id(),
        started_at: ctx.started_at(),
        duration_ms: elapsed_ms(ctx),
        stages_completed: completed,
        result: RunResult::Failed(PipelineFailure {
            stage: Some(stage),
            reason,
            error,
            partial: ctx.result(stage).cloned(),
        }),
    }
}

/// Success requires every payload part; a stage list that skips one of them
/// ends as a fault naming the missing stage.
fn finish(ctx: StageContext, completed: Vec<StageKind>) -> PipelineOutcome {
    let payload = match (ctx.validation(), ctx.structured(), ctx.quality()) {
        (Some(validation), Some(structured), Some(quality)) => PipelinePayload {
            prompt: structured.prompt.clone(),
            quality_score: quality.overall,
            validation: validation.clone(),
            quality: quality.clone(),
        },
        (validation, structured, _) => {
            let kind = if validation.is_none() {
                StageKind::ValidateDocument
            } else if structured.is_none() {
                StageKind::AnalyzeStructure
            } else {
                StageKind::ScoreQuality
            };
            let error = StageError::MissingPriorResult(kind).to_string();
            tracing::error!(run_id = %ctx.run_id(), stage = kind.as_str(), "Pipeline incomplete");
            return failed(&ctx, completed, kind, FailureReason::InternalFault, error);
        }
    };

    let duration_ms = elapsed_ms(&ctx);
    tracing::info!(
        run_id = %ctx.run_id(),
        quality = payload.quality_score,
        duration_ms = duration_ms,
        "Pipeline completed"
    );

    PipelineOutcome {
        success: true,
        run_id: ctx.run_id(),
        started_at: ctx.started_at(),
        duration_ms,
        stages_completed: completed,
        result: RunResult::Completed(Box::new(payload)),
    }
}

fn elapsed_ms(ctx: &StageContext) -> i64 {
    (Utc::now() - ctx.started_at()).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::pipeline::orchestrator::{StageResult, StructuredPrompt};
    use crate::pipeline::structuring::ProjectContext;

    /// Stage with scripted behavior that counts its invocations.
    struct Scripted {
        kind: StageKind,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Pass,
        FailGate,
        Fault,
        Panic,
    }

    impl Stage for Scripted {
        fn kind(&self) -> StageKind {
            self.kind
        }

        fn run(&self, _ctx: &StageContext) -> Result<StageReport, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = StageResult::Structured(StructuredPrompt {
                prompt: "# Task".into(),
                project: ProjectContext::default(),
            });
            match self.behavior {
                Behavior::Pass => Ok(StageReport::pass(result)),
                Behavior::FailGate => Ok(StageReport::fail(
                    Some(result),
                    FailureReason::ThresholdNotMet,
                    "too low",
                )),
                Behavior::Fault => Err(StageError::Internal("boom".into())),
                Behavior::Panic => panic!("stage exploded"),
            }
        }
    }

    fn scripted(kind: StageKind, behavior: Behavior, calls: &Arc<AtomicUsize>) -> Box<dyn Stage> {
        Box::new(Scripted {
            kind,
            behavior,
            calls: Arc::clone(calls),
        })
    }

    #[test]
    fn halts_at_first_failed_gate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_stages(vec![
            scripted(StageKind::AnalyzeStructure, Behavior::FailGate, &calls),
            scripted(StageKind::ScoreQuality, Behavior::Pass, &calls),
        ]);

        let outcome = pipeline.process(PipelineRequest::new("doc"));
        assert!(!outcome.success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.stage, Some(StageKind::AnalyzeStructure));
        assert_eq!(failure.reason, FailureReason::ThresholdNotMet);
        assert_eq!(failure.error, "too low");
        assert!(failure.partial.is_some());
        assert!(outcome.stages_completed.is_empty());
    }

    #[test]
    fn stage_error_becomes_internal_fault() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_stages(vec![
            scripted(StageKind::ValidateDocument, Behavior::Fault, &calls),
            scripted(StageKind::AnalyzeStructure, Behavior::Pass, &calls),
        ]);
        let outcome = pipeline.process(PipelineRequest::new("doc"));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.reason, FailureReason::InternalFault);
        assert_eq!(failure.stage, Some(StageKind::ValidateDocument));
        assert!(failure.error.contains("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_stage_is_contained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_stages(vec![
            scripted(StageKind::AnalyzeStructure, Behavior::Pass, &calls),
            scripted(StageKind::ScoreQuality, Behavior::Panic, &calls),
        ]);
        let outcome = pipeline.process(PipelineRequest::new("doc"));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.reason, FailureReason::InternalFault);
        assert_eq!(failure.stage, Some(StageKind::ScoreQuality));
        assert!(failure.error.contains("stage exploded"));
        assert_eq!(outcome.stages_completed, vec![StageKind::AnalyzeStructure]);
    }

    #[test]
    fn duplicate_stage_kind_is_a_conflict() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_stages(vec![
            scripted(StageKind::AnalyzeStructure, Behavior::Pass, &calls),
            scripted(StageKind::AnalyzeStructure, Behavior::Pass, &calls),
        ]);
        let outcome = pipeline.process(PipelineRequest::new("doc"));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.reason, FailureReason::InternalFault);
        assert!(failure.error.contains("analyze-structure"));
    }

    #[test]
    fn missing_payload_part_is_not_a_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_stages(vec![scripted(
            StageKind::AnalyzeStructure,
            Behavior::Pass,
            &calls,
        )]);
        let outcome = pipeline.process(PipelineRequest::new("doc"));
        assert!(!outcome.success);
        assert!(outcome.payload().is_none());
        assert_eq!(
            outcome.failure().unwrap().stage,
            Some(StageKind::ValidateDocument)
        );
    }

    #[test]
    fn standard_stage_order() {
        assert_eq!(Pipeline::standard().stage_kinds(), StageKind::ORDER.to_vec());
    }

    #[tokio::test]
    async fn async_runs_are_independent() {
        let pipeline = Arc::new(Pipeline::standard());
        let a = tokio::spawn(Arc::clone(&pipeline).process_async(PipelineRequest::new("")));
        let b = tokio::spawn(Arc::clone(&pipeline).process_async(PipelineRequest::new("  ")));
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert_ne!(a.run_id, b.run_id);
        for outcome in [a, b] {
            let failure = outcome.failure().unwrap();
            assert_eq!(failure.reason, FailureReason::InputMalformed);
            assert_eq!(failure.stage, Some(StageKind::ValidateDocument));
        }
    }
}
