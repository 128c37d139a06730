//! The batch driver: catalog -> scheduler -> sink, once per model.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bimbench_core::engine::runner::{default_parallelism, discover_models};
use bimbench_core::report::{console, csv, json, progress, RunArtifacts};
use bimbench_core::{catalog, RunOptions, Runner, SubprocessIsolation};

use super::super::args::{OutputFormat, RunArgs};
use crate::exit_codes::SUCCESS;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let questions = catalog::load(&args.questions)?;
    eprintln!(
        "Loaded {} questions from {}",
        questions.len(),
        args.questions.display()
    );

    let options = RunOptions {
        timeout: Duration::from_secs(args.timeout),
        parallel: args.parallel.unwrap_or_else(default_parallelism),
        question_ids: (!args.question_ids.is_empty()).then(|| args.question_ids.clone()),
    };
    let runner = Runner::new(Arc::new(SubprocessIsolation::discover()), options);

    if args.target.is_dir() {
        let models = discover_models(&args.target)?;
        eprintln!(
            "Running benchmarks for {} models in {}",
            models.len(),
            args.target.display()
        );
        if args.output.is_some() {
            tracing::warn!("--output is ignored for directory targets; using --out-dir");
        }
        let mut skipped = 0usize;
        for model in &models {
            // One model's failure never stops the batch.
            if let Err(err) = run_one(&runner, model, &questions, &args, false).await {
                skipped += 1;
                tracing::warn!(model = %model.display(), "skipping model: {err:#}");
                eprintln!("warning: skipping {}: {err:#}", model.display());
            }
        }
        if skipped > 0 {
            eprintln!("{skipped} of {} models skipped", models.len());
        }
        Ok(SUCCESS)
    } else {
        run_one(&runner, &args.target, &questions, &args, true).await?;
        Ok(SUCCESS)
    }
}

async fn run_one(
    runner: &Runner,
    model: &Path,
    questions: &[bimbench_core::Question],
    args: &RunArgs,
    single: bool,
) -> anyhow::Result<()> {
    let total = runner.selected_questions(questions).len();
    let progress = progress::default_progress_sink(total);

    let artifacts = runner
        .run_model(model, questions, progress)
        .await?
        .with_catalog(args.questions.clone());

    let out_path = match (&args.output, single) {
        (Some(path), true) => path.clone(),
        _ => args.out_dir.join(match args.format {
            OutputFormat::Csv => artifacts.default_csv_name(),
            OutputFormat::Json => artifacts.default_json_name(),
        }),
    };
    write_artifacts(&artifacts, &out_path, args.format)?;

    console::print_summary(&artifacts);
    eprintln!("Results saved to {}", out_path.display());
    Ok(())
}

fn write_artifacts(
    artifacts: &RunArtifacts,
    out_path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => csv::write_csv(artifacts, out_path),
        OutputFormat::Json => json::write_json(artifacts, out_path),
    }
}
