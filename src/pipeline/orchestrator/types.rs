use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_QUALITY_THRESHOLD;
use crate::pipeline::quality::{QualityOutcome, ReferenceContext};
use crate::pipeline::structuring::{ProjectContext, ValidationOutcome};

// ═══════════════════════════════════════════════════════════
// Stages
// ═══════════════════════════════════════════════════════════

/// Named pipeline stage. Each stage records its result under its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    ValidateDocument,
    AnalyzeStructure,
    ScoreQuality,
}

impl StageKind {
    /// Standard execution order.
    pub const ORDER: [StageKind; 3] = [
        StageKind::ValidateDocument,
        StageKind::AnalyzeStructure,
        StageKind::ScoreQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateDocument => "validate-document",
            Self::AnalyzeStructure => "analyze-structure",
            Self::ScoreQuality => "score-quality",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub document: String,
    /// Relative paths of an existing project, from an external directory scan.
    #[serde(default)]
    pub project_files: Vec<String>,
    /// Sections the generated prompt is scored against. When absent, the
    /// validated document's own sections are used.
    #[serde(default)]
    pub reference: Option<ReferenceContext>,
    #[serde(default = "default_threshold")]
    pub quality_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_QUALITY_THRESHOLD
}

impl PipelineRequest {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            project_files: Vec::new(),
            reference: None,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }

    pub fn with_project_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reference(mut self, reference: ReferenceContext) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }
}

/// Prompt assembled from the validated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredPrompt {
    pub prompt: String,
    pub project: ProjectContext,
}

/// Typed result of one stage, one variant per stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageResult {
    Validated(ValidationOutcome),
    Structured(StructuredPrompt),
    Scored(QualityOutcome),
}

/// Why a run stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Empty document, out-of-range threshold, malformed reference.
    InputMalformed,
    /// A stage produced a valid but insufficient result.
    ThresholdNotMet,
    /// Unexpected error or panic inside a stage.
    InternalFault,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputMalformed => "input_malformed",
            Self::ThresholdNotMet => "threshold_not_met",
            Self::InternalFault => "internal_fault",
        }
    }
}

/// Whether the run may continue past a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Pass,
    Fail { reason: FailureReason, detail: String },
}

/// What a stage returns on a normal (non-fault) exit.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Absent only when the stage rejected its input before producing anything.
    pub result: Option<StageResult>,
    pub gate: Gate,
}

impl StageReport {
    pub fn pass(result: StageResult) -> Self {
        Self {
            result: Some(result),
            gate: Gate::Pass,
        }
    }

    pub fn fail(result: Option<StageResult>, reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            result,
            gate: Gate::Fail {
                reason,
                detail: detail.into(),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Run outcome
// ═══════════════════════════════════════════════════════════

/// Success payload: everything the downstream collaborator needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelinePayload {
    pub prompt: String,
    pub quality_score: f64,
    pub validation: ValidationOutcome,
    pub quality: QualityOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineFailure {
    /// Stage that stopped the run. Absent only if the run was lost outside
    /// any stage (e.g. the worker task was cancelled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageKind>,
    pub reason: FailureReason,
    pub error: String,
    /// The failing stage's own result, when it produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<StageResult>,
}

/// Exactly one of payload or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunResult {
    Completed(Box<PipelinePayload>),
    Failed(PipelineFailure),
}

/// Final result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub stages_completed: Vec<StageKind>,
    #[serde(flatten)]
    pub result: RunResult,
}

impl PipelineOutcome {
    pub fn payload(&self) -> Option<&PipelinePayload> {
        match &self.result {
            RunResult::Completed(payload) => Some(&**payload),
            RunResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        match &self.result {
            RunResult::Completed(_) => None,
            RunResult::Failed(failure) => Some(failure),
        }
    }
}
