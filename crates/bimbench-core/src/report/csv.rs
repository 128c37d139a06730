//! Tabular result sink: one row per question, question-id order.

use std::path::Path;

use anyhow::Context;

use super::RunArtifacts;

pub const CSV_HEADER: [&str; 6] = [
    "question_id",
    "question_text",
    "result",
    "difficulty",
    "model",
    "time_seconds",
];

/// Write the result table. Always overwrites: a run's artifact is a
/// function of that run alone, never a merge with a previous one.
pub fn write_csv(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to open {} for writing", out.display()))?;
    writer.write_record(CSV_HEADER)?;

    let model = artifacts.model_path.display().to_string();
    for outcome in &artifacts.outcomes {
        let result = outcome.verdict.render();
        let elapsed = format!("{:.3}", outcome.elapsed_seconds);
        writer.write_record([
            outcome.question_id.as_str(),
            outcome.question_text.as_str(),
            result.as_str(),
            outcome.difficulty.as_str(),
            model.as_str(),
            elapsed.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
