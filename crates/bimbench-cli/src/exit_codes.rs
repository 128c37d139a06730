//! Unified exit codes. Per-question failures are recorded in the result
//! artifact and never change `run`'s exit code; only setup failures do.

pub const SUCCESS: i32 = 0;
/// A single-question evaluation (`ask`) failed or timed out.
pub const TASK_FAILED: i32 = 1;
/// Missing model/catalog, unsupported catalog format, or another setup error.
pub const SETUP_ERROR: i32 = 2;
