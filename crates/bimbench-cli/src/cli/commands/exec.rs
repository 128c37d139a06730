//! Worker entry point, spawned once per task by the scheduler.
//!
//! Prints exactly one JSON verdict envelope on stdout. Evaluation failures
//! are carried in the envelope with exit 0; a non-zero exit means this
//! process died before reporting and the parent records a crash.

use bimbench_core::engine::executor;
use bimbench_core::evaluator::builtin;

use super::super::args::ExecArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: ExecArgs) -> anyhow::Result<i32> {
    let registry = builtin::registry();
    let verdict = executor::execute(&registry, &args.model, &args.script);
    println!("{}", serde_json::to_string(&verdict)?);
    Ok(SUCCESS)
}
