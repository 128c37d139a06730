//! Single-question path: resolve one script, run it in-process, print the
//! answer. Unlike `run`, a failed evaluation here is a non-zero exit.

use std::sync::Arc;
use std::time::Duration;

use bimbench_core::evaluator::builtin;
use bimbench_core::model::Verdict;
use bimbench_core::{InProcessIsolation, TaskIsolation, TaskSpec};

use super::super::args::AskArgs;
use crate::exit_codes::{SUCCESS, TASK_FAILED};

pub async fn run(args: AskArgs) -> anyhow::Result<i32> {
    eprintln!(
        "Running script '{}' on IFC file '{}'...",
        args.script.display(),
        args.model.display()
    );

    let isolation = InProcessIsolation::new(Arc::new(builtin::registry()));
    let spec = TaskSpec {
        model_path: args.model.clone(),
        script_path: args.script.clone(),
        timeout: Duration::from_secs(args.timeout),
    };
    let report = isolation.run(&spec).await;

    match report.verdict {
        Verdict::Answered { answer } => {
            println!("Answer: {answer}");
            Ok(SUCCESS)
        }
        Verdict::Failed { error } => {
            eprintln!("Error: {error}");
            Ok(TASK_FAILED)
        }
        Verdict::TimedOut => {
            eprintln!("Error: evaluation exceeded {}s timeout", args.timeout);
            Ok(TASK_FAILED)
        }
    }
}
