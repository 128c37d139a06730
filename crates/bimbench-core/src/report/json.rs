//! Structured per-run sink: run metadata plus the full outcome array.

use std::path::Path;

use anyhow::Context;

use super::RunArtifacts;

pub fn write_json(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let v = serde_json::json!({
        "benchmark_info": {
            "ifc_file": artifacts.model_path,
            "benchmark_source": artifacts.catalog_path,
            "execution_time": artifacts.executed_at.to_rfc3339(),
            "total_questions": artifacts.summary.total_questions,
            "successful_answers": artifacts.summary.answered,
            "failed_answers": artifacts.summary.failed,
            "timed_out": artifacts.summary.timed_out,
        },
        "results": artifacts.outcomes,
    });
    std::fs::write(out, serde_json::to_string_pretty(&v)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
