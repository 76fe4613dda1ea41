use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{PipelineRequest, StageKind, StageResult, StructuredPrompt};
use super::StageError;
use crate::pipeline::quality::QualityOutcome;
use crate::pipeline::structuring::ValidationOutcome;

/// Per-run accumulator threaded through the stages.
///
/// Created fresh for every run and dropped when the run ends. Stages only
/// read it; the orchestrator writes each stage's result under that stage's
/// kind, and a kind can be written once.
#[derive(Debug)]
pub struct StageContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    request: PipelineRequest,
    results: BTreeMap<StageKind, StageResult>,
    order: Vec<StageKind>,
}

impl StageContext {
    pub fn new(request: PipelineRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            request,
            results: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn request(&self) -> &PipelineRequest {
        &self.request
    }

    /// Store a stage's result. A second write for the same kind is rejected
    /// and leaves the first in place.
    pub fn record(&mut self, kind: StageKind, result: StageResult) -> Result<(), StageError> {
        if self.results.contains_key(&kind) {
            return Err(StageError::ContextConflict(kind));
        }
        self.results.insert(kind, result);
        self.order.push(kind);
        Ok(())
    }

    pub fn result(&self, kind: StageKind) -> Option<&StageResult> {
        self.results.get(&kind)
    }

    /// Kinds with a recorded result, in the order they were recorded.
    pub fn recorded(&self) -> &[StageKind] {
        &self.order
    }

    pub fn validation(&self) -> Option<&ValidationOutcome> {
        self.results.values().find_map(|r| match r {
            StageResult::Validated(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn structured(&self) -> Option<&StructuredPrompt> {
        self.results.values().find_map(|r| match r {
            StageResult::Structured(prompt) => Some(prompt),
            _ => None,
        })
    }

    pub fn quality(&self) -> Option<&QualityOutcome> {
        self.results.values().find_map(|r| match r {
            StageResult::Scored(outcome) => Some(outcome),
            _ => None,
        })
    }
}
