//! Result aggregation and sinks.

pub mod console;
pub mod csv;
pub mod json;
pub mod progress;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Outcome, Verdict};

/// Run-level totals. `timed_out` is tracked separately from `failed`: a
/// timeout means the harness killed the task, not that the task failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub failed: usize,
    pub timed_out: usize,
}

/// The aggregated result of one model run: outcomes sorted by question id
/// plus run metadata. Created once per run, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub model_path: PathBuf,
    pub model_stem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub executed_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub outcomes: Vec<Outcome>,
}

impl RunArtifacts {
    pub fn new(model_path: &Path, executed_at: DateTime<Utc>, outcomes: Vec<Outcome>) -> Self {
        let mut summary = RunSummary {
            total_questions: outcomes.len(),
            ..RunSummary::default()
        };
        for outcome in &outcomes {
            match outcome.verdict {
                Verdict::Answered { .. } => summary.answered += 1,
                Verdict::Failed { .. } => summary.failed += 1,
                Verdict::TimedOut => summary.timed_out += 1,
            }
        }

        let model_stem = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        Self {
            model_path: model_path.to_path_buf(),
            model_stem,
            catalog_path: None,
            executed_at,
            summary,
            outcomes,
        }
    }

    pub fn with_catalog(mut self, catalog_path: PathBuf) -> Self {
        self.catalog_path = Some(catalog_path);
        self
    }

    /// Tabular artifact name derived from the model's identity.
    pub fn default_csv_name(&self) -> String {
        format!("{}_answers.csv", self.model_stem)
    }

    pub fn default_json_name(&self) -> String {
        format!("{}_results.json", self.model_stem)
    }
}
