//! Core data model: catalog questions and per-question outcomes.

use serde::{Deserialize, Serialize};

/// One benchmark question as loaded from the catalog. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Opaque identifier; unique within a catalog and the stable ordering key
    /// for the result table.
    pub question_id: String,
    pub question_text: String,
    /// Locator for the evaluation logic, e.g. `scripts/001_count_walls.py`.
    /// Resolved against the unit registry by file stem; a reference that does
    /// not resolve becomes a per-task failure, not a load error.
    pub script_path: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Terminal result of evaluating one question. Timeouts are a distinct kind,
/// not a flavor of failure: they mean the evaluation needed forced
/// termination rather than terminating itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Answered { answer: serde_json::Value },
    Failed { error: String },
    TimedOut,
}

/// Marker written to tabular artifacts for timed-out questions.
pub const TIMEOUT_MARKER: &str = "EXECUTION TIMEOUT";

impl Verdict {
    pub fn answered(value: serde_json::Value) -> Self {
        Verdict::Answered { answer: value }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Verdict::Failed {
            error: message.into(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Verdict::Answered { .. })
    }

    /// Render for a tabular cell: strings bare, other scalars and structures
    /// as compact JSON, failures prefixed with `Error:`.
    pub fn render(&self) -> String {
        match self {
            Verdict::Answered { answer } => match answer {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            Verdict::Failed { error } => format!("Error: {error}"),
            Verdict::TimedOut => TIMEOUT_MARKER.to_string(),
        }
    }
}

/// The recorded result of one task: question metadata joined with its
/// verdict and elapsed wall-clock time. Written once, read at aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub question_id: String,
    pub question_text: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub elapsed_seconds: f64,
}
