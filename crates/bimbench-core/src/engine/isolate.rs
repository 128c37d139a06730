//! Isolated task execution.
//!
//! Evaluators are untrusted, independently-authored code: they may loop
//! forever, exhaust memory, or take the process down. With panic=abort in
//! every profile, `catch_unwind` is not an option, so containment comes from
//! the execution context instead: each task runs either in a dedicated child
//! process (production) or on a detached thread (tests, single-question
//! path), and the harness enforces the wall-clock timeout from outside.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::executor;
use crate::evaluator::UnitRegistry;
use crate::model::Verdict;

/// Env var that overrides worker-binary discovery.
pub const WORKER_BIN_ENV: &str = "BIMBENCH_BIN";

/// Cap on the stderr excerpt carried into a crash verdict.
const STDERR_CAP: usize = 4096;

/// One task handed to an isolation backend.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub model_path: PathBuf,
    pub script_path: PathBuf,
    pub timeout: Duration,
}

/// Terminal report for one task. Never an error: every failure mode of the
/// execution context is folded into the verdict.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub verdict: Verdict,
    pub elapsed_seconds: f64,
}

impl TaskReport {
    fn finished(verdict: Verdict, started: Instant) -> Self {
        Self {
            verdict,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        }
    }

    /// Timed-out tasks record the configured timeout, not the (killed)
    /// child's actual runtime.
    fn timed_out(timeout: Duration) -> Self {
        Self {
            verdict: Verdict::TimedOut,
            elapsed_seconds: timeout.as_secs_f64(),
        }
    }
}

/// An execution context that can fail independently of the scheduler.
#[async_trait]
pub trait TaskIsolation: Send + Sync {
    async fn run(&self, spec: &TaskSpec) -> TaskReport;
}

/// Process-per-task isolation: spawns the harness binary's hidden `exec`
/// subcommand and reads a single-line JSON verdict envelope from its stdout.
/// On timeout the child is killed rather than waited on.
pub struct SubprocessIsolation {
    worker_bin: PathBuf,
}

impl SubprocessIsolation {
    pub fn with_binary(worker_bin: PathBuf) -> Self {
        Self { worker_bin }
    }

    /// Find the worker binary: `BIMBENCH_BIN`, then the current executable,
    /// then a PATH lookup.
    pub fn discover() -> Self {
        if let Ok(bin) = std::env::var(WORKER_BIN_ENV) {
            let path = PathBuf::from(bin);
            if path.exists() {
                return Self::with_binary(path);
            }
        }
        if let Ok(exe) = std::env::current_exe() {
            return Self::with_binary(exe);
        }
        Self::with_binary(PathBuf::from("bimbench"))
    }
}

#[async_trait]
impl TaskIsolation for SubprocessIsolation {
    async fn run(&self, spec: &TaskSpec) -> TaskReport {
        let started = Instant::now();

        let mut cmd = tokio::process::Command::new(&self.worker_bin);
        cmd.arg("exec")
            .arg("--model")
            .arg(&spec.model_path)
            .arg("--script")
            .arg(&spec.script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return TaskReport::finished(
                    Verdict::failed(format!(
                        "failed to spawn worker {}: {err}",
                        self.worker_bin.display()
                    )),
                    started,
                )
            }
        };

        // Dropping the wait future on timeout kills the child (kill_on_drop)
        // and reaps it in the background.
        match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Err(_) => TaskReport::timed_out(spec.timeout),
            Ok(Err(err)) => TaskReport::finished(
                Verdict::failed(format!("failed to wait on worker: {err}")),
                started,
            ),
            Ok(Ok(output)) => {
                let verdict = decode_worker_output(&output);
                TaskReport::finished(verdict, started)
            }
        }
    }
}

/// Last non-empty stdout line is the envelope; anything else means the
/// worker crashed before reporting.
fn decode_worker_output(output: &std::process::Output) -> Verdict {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(line) = stdout.lines().rev().find(|l| !l.trim().is_empty()) {
        if let Ok(verdict) = serde_json::from_str::<Verdict>(line.trim()) {
            return verdict;
        }
    }

    let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    stderr.truncate(STDERR_CAP);
    let exit = match output.status.code() {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    };
    if stderr.trim().is_empty() {
        Verdict::failed(format!("worker terminated by {exit} without a result"))
    } else {
        Verdict::failed(format!(
            "worker terminated by {exit} without a result: {}",
            stderr.trim()
        ))
    }
}

/// Thread-per-task isolation for tests and the single-question path. A task
/// that outlives its timeout is abandoned on its detached thread; the
/// process-level backend is the one that reclaims runaway work.
pub struct InProcessIsolation {
    registry: Arc<UnitRegistry>,
}

impl InProcessIsolation {
    pub fn new(registry: Arc<UnitRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl TaskIsolation for InProcessIsolation {
    async fn run(&self, spec: &TaskSpec) -> TaskReport {
        let started = Instant::now();
        let registry = self.registry.clone();
        let model_path = spec.model_path.clone();
        let script_path = spec.script_path.clone();

        let (tx, rx) = tokio::sync::oneshot::channel();
        std::thread::spawn(move || {
            let _ = tx.send(executor::execute(&registry, &model_path, &script_path));
        });

        match tokio::time::timeout(spec.timeout, rx).await {
            Err(_) => TaskReport::timed_out(spec.timeout),
            Ok(Ok(verdict)) => TaskReport::finished(verdict, started),
            Ok(Err(_)) => TaskReport::finished(
                Verdict::failed("evaluator thread terminated without a result"),
                started,
            ),
        }
    }
}
