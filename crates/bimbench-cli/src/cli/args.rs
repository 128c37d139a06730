use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bimbench_core::DEFAULT_TASK_TIMEOUT_SECS;

#[derive(Parser)]
#[command(
    name = "bimbench",
    version,
    about = "Run building-model benchmark questions against IFC files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the question catalog against a model file or a directory of models
    Run(RunArgs),
    /// Answer a single question script against one model
    Ask(AskArgs),
    /// Internal worker: execute one task and print its result envelope
    #[command(hide = true)]
    Exec(ExecArgs),
    Version,
}

#[derive(clap::Args, Clone)]
pub struct RunArgs {
    /// IFC model file, or a directory containing .ifc models
    pub target: PathBuf,

    /// Path to the questions catalog (.csv or .json)
    #[arg(long, default_value = "data/questions.csv")]
    pub questions: PathBuf,

    /// Limit execution to specific question IDs (can be repeated)
    #[arg(long = "question-id")]
    pub question_ids: Vec<String>,

    /// Directory for result tables
    #[arg(long, default_value = "data/benchmark_results")]
    pub out_dir: PathBuf,

    /// Explicit output path (single-model runs only)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Result artifact format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Per-question timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TASK_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Worker-pool width (defaults to host parallelism)
    #[arg(long)]
    pub parallel: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        })
    }
}

#[derive(clap::Args, Clone)]
pub struct AskArgs {
    /// IFC model file
    pub model: PathBuf,

    /// Question script reference, e.g. scripts/001_count_walls.py
    pub script: PathBuf,

    /// Timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TASK_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(clap::Args, Clone)]
pub struct ExecArgs {
    #[arg(long)]
    pub model: PathBuf,

    #[arg(long)]
    pub script: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::Parser;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_with_defaults() {
        let cli = Cli::try_parse_from(["bimbench", "run", "models/house.ifc"])
            .expect("parse should succeed");
        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.target, PathBuf::from("models/house.ifc"));
                assert_eq!(args.questions, PathBuf::from("data/questions.csv"));
                assert_eq!(args.timeout, DEFAULT_TASK_TIMEOUT_SECS);
                assert_eq!(args.format, OutputFormat::Csv);
                assert!(args.question_ids.is_empty());
                assert_eq!(args.parallel, None);
            }
            _ => panic!("expected Command::Run"),
        }
    }

    #[test]
    fn run_accepts_repeated_question_ids() {
        let cli = Cli::try_parse_from([
            "bimbench",
            "run",
            "models",
            "--question-id",
            "Q001",
            "--question-id",
            "Q013",
            "--timeout",
            "120",
        ])
        .expect("parse should succeed");
        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.question_ids, vec!["Q001", "Q013"]);
                assert_eq!(args.timeout, 120);
            }
            _ => panic!("expected Command::Run"),
        }
    }
}
