//! Bounded fan-out scheduler.
//!
//! One task per question, submitted to a `JoinSet` behind a semaphore sized
//! to the worker-pool width. Results are collected in completion order and
//! sorted by question id before aggregation, so the persisted table's order
//! never depends on scheduling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::isolate::{TaskIsolation, TaskSpec};
use crate::errors::SetupError;
use crate::model::{Outcome, Question, Verdict};
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::report::RunArtifacts;

/// Default per-task wall-clock timeout, in seconds. Generous: geometry-heavy
/// evaluators on large models are slow, and a timeout is a kill, not a retry.
pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 8000;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub timeout: Duration,
    /// Worker-pool width; defaults to host available parallelism.
    pub parallel: usize,
    /// When set, only questions with these ids are submitted.
    pub question_ids: Option<Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TASK_TIMEOUT_SECS),
            parallel: default_parallelism(),
            question_ids: None,
        }
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub struct Runner {
    isolation: Arc<dyn TaskIsolation>,
    options: RunOptions,
}

impl Runner {
    pub fn new(isolation: Arc<dyn TaskIsolation>, options: RunOptions) -> Self {
        Self { isolation, options }
    }

    /// The questions that would actually be submitted, after the id filter.
    pub fn selected_questions(&self, questions: &[Question]) -> Vec<Question> {
        match &self.options.question_ids {
            None => questions.to_vec(),
            Some(ids) => questions
                .iter()
                .filter(|q| ids.contains(&q.question_id))
                .cloned()
                .collect(),
        }
    }

    /// Run every selected question against one model and aggregate exactly
    /// one outcome per question, sorted by question id. There is no partial
    /// return: the future resolves only once all tasks are terminal.
    pub async fn run_model(
        &self,
        model_path: &Path,
        questions: &[Question],
        progress: Option<ProgressSink>,
    ) -> anyhow::Result<RunArtifacts> {
        if !model_path.exists() {
            return Err(SetupError::ModelNotFound(model_path.to_path_buf()).into());
        }

        let selected = self.selected_questions(questions);
        let total = selected.len();
        tracing::debug!(
            model = %model_path.display(),
            questions = total,
            parallel = self.options.parallel,
            "starting benchmark run"
        );

        let started_at = Utc::now();
        let sem = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let mut join_set = JoinSet::new();

        for question in selected {
            let permit = sem.clone().acquire_owned().await?;
            let isolation = self.isolation.clone();
            let spec = TaskSpec {
                model_path: model_path.to_path_buf(),
                script_path: PathBuf::from(&question.script_path),
                timeout: self.options.timeout,
            };
            join_set.spawn(async move {
                let _permit = permit;
                let report = isolation.run(&spec).await;
                (question, report)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            let outcome = match joined {
                Ok((question, report)) => Outcome {
                    question_id: question.question_id,
                    question_text: question.question_text,
                    difficulty: question.difficulty,
                    verdict: report.verdict,
                    elapsed_seconds: report.elapsed_seconds,
                },
                // A panicked task still gets a row; no submission is dropped.
                Err(err) => Outcome {
                    question_id: "unknown".into(),
                    question_text: String::new(),
                    difficulty: String::new(),
                    verdict: Verdict::failed(format!("join error: {err}")),
                    elapsed_seconds: 0.0,
                },
            };
            outcomes.push(outcome);
            if let Some(sink) = &progress {
                sink(ProgressEvent {
                    done: outcomes.len(),
                    total,
                });
            }
        }

        // Deterministic order for artifacts, independent of completion order.
        outcomes.sort_by(|a, b| a.question_id.cmp(&b.question_id));

        Ok(RunArtifacts::new(model_path, started_at, outcomes))
    }
}

/// Discover `.ifc` models in a directory, in sorted order.
pub fn discover_models(models_dir: &Path) -> Result<Vec<PathBuf>, SetupError> {
    if !models_dir.is_dir() {
        return Err(SetupError::ModelsDirNotFound(models_dir.to_path_buf()));
    }
    let mut models: Vec<PathBuf> = std::fs::read_dir(models_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ifc"))
        })
        .collect();
    models.sort();
    if models.is_empty() {
        return Err(SetupError::NoModels(models_dir.to_path_buf()));
    }
    Ok(models)
}
