//! Human-facing run output, printed to stderr.

use crate::model::{Verdict, TIMEOUT_MARKER};
use crate::report::RunArtifacts;

/// Truncation width for inline answers in the per-row listing.
const ANSWER_WIDTH: usize = 80;

pub fn print_summary(artifacts: &RunArtifacts) {
    eprintln!();
    for outcome in &artifacts.outcomes {
        let duration = format!("({:.1}s)", outcome.elapsed_seconds);
        match &outcome.verdict {
            Verdict::Answered { answer } => {
                eprintln!(
                    "✅ {:<16} {}  {}",
                    outcome.question_id,
                    short(&answer.to_string()),
                    duration
                );
            }
            Verdict::Failed { error } => {
                eprintln!("❌ {:<16} {}", outcome.question_id, short(error));
            }
            Verdict::TimedOut => {
                eprintln!(
                    "⏱️  {:<16} {TIMEOUT_MARKER} {}",
                    outcome.question_id, duration
                );
            }
        }
    }

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary for {}: {} answered, {} failed, {} timed out ({} questions)",
        artifacts.model_path.display(),
        artifacts.summary.answered,
        artifacts.summary.failed,
        artifacts.summary.timed_out,
        artifacts.summary.total_questions,
    );
}

fn short(text: &str) -> String {
    if text.chars().count() > ANSWER_WIDTH {
        let truncated: String = text.chars().take(ANSWER_WIDTH).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
