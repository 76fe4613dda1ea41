use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::structuring::{DocumentModel, InputError};

// ═══════════════════════════════════════════════════════════
// Metrics
// ═══════════════════════════════════════════════════════════

/// One independently scored dimension of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMetric {
    Completeness,
    TechnicalAccuracy,
    Compatibility,
    Clarity,
    Specificity,
    Actionability,
}

impl QualityMetric {
    pub const ALL: [QualityMetric; 6] = [
        QualityMetric::Completeness,
        QualityMetric::TechnicalAccuracy,
        QualityMetric::Compatibility,
        QualityMetric::Clarity,
        QualityMetric::Specificity,
        QualityMetric::Actionability,
    ];

    /// Fixed aggregation weight. The six weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Completeness => 0.25,
            Self::TechnicalAccuracy => 0.25,
            Self::Compatibility => 0.20,
            Self::Clarity => 0.10,
            Self::Specificity => 0.10,
            Self::Actionability => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::TechnicalAccuracy => "technical_accuracy",
            Self::Compatibility => "compatibility",
            Self::Clarity => "clarity",
            Self::Specificity => "specificity",
            Self::Actionability => "actionability",
        }
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and explanation for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetricResult {
    pub metric: QualityMetric,
    /// Nominally in [0, 1]; technical accuracy is left unclamped.
    pub score: f64,
    pub detail: String,
    pub suggestions: Vec<String>,
}

/// Aggregate verdict over all metrics for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityOutcome {
    /// Weighted mean of the metric scores, clamped to [0, 1].
    pub overall: f64,
    pub metrics: Vec<QualityMetricResult>,
    /// `overall >= threshold`.
    pub passed: bool,
    pub threshold: f64,
    pub critical: Vec<String>,
    /// Suggestions from every metric, de-duplicated in first-seen order.
    pub suggestions: Vec<String>,
}

impl QualityOutcome {
    pub fn metric(&self, metric: QualityMetric) -> Option<&QualityMetricResult> {
        self.metrics.iter().find(|r| r.metric == metric)
    }
}

// ═══════════════════════════════════════════════════════════
// Reference context
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSection {
    pub title: String,
    pub content: String,
}

/// Sections of the source document an artifact is expected to address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceContext {
    pub sections: Vec<ReferenceSection>,
}

impl ReferenceContext {
    /// Accept a loosely-typed `{"sections": [{"title", "content"}, ...]}` payload.
    /// Extra keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, InputError> {
        let items = value
            .get("sections")
            .and_then(Value::as_array)
            .ok_or_else(|| InputError::MalformedReference("missing 'sections' array".into()))?;

        let sections = items
            .iter()
            .enumerate()
            .map(|(i, item)| -> Result<ReferenceSection, InputError> {
                let field = |key: &str| {
                    item.get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            InputError::MalformedReference(format!(
                                "section {i} has no string '{key}'"
                            ))
                        })
                };
                Ok(ReferenceSection {
                    title: field("title")?,
                    content: field("content")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sections })
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl From<&DocumentModel> for ReferenceContext {
    fn from(model: &DocumentModel) -> Self {
        Self {
            sections: model
                .sections
                .iter()
                .map(|s| ReferenceSection {
                    title: s.title.clone(),
                    content: s.content.clone(),
                })
                .collect(),
        }
    }
}
