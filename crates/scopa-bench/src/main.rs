use std::path::PathBuf;

use clap::Parser;

use scopa_bench::config::{BenchmarkConfig, ResolvedOutputs};
use scopa_bench::logging::init_logging;
use scopa_bench::runner::MatchRunner;

/// Seeded match harness for Scopa agents.
#[derive(Debug, Parser)]
#[command(
    name = "scopa-bench",
    author,
    version,
    about = "Deterministic two-player Scopa match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Deal every match from the fixed test deck.
    #[arg(long)]
    fixed_deck: bool,

    /// Keep both agents in the same seats for every match.
    #[arg(long)]
    no_swap: bool,

    /// Attach the final match snapshot to every JSONL row.
    #[arg(long)]
    snapshots: bool,

    /// Log every decision, not only match results (requires structured logging).
    #[arg(long)]
    log_play_details: bool,

    /// Exit after validating the configuration (no matches are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if cli.fixed_deck {
        config.matches.fixed_deck = true;
    }

    if cli.no_swap {
        config.matches.swap_seats = false;
    }

    if cli.snapshots {
        config.outputs.include_snapshots = true;
    }

    if cli.log_play_details {
        config.logging.play_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let count = config.matches.count;
    let agents = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!("Loaded configuration '{run_id}': {agents} over {count} matches");

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = MatchRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: match execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} matches → {} rows at {}",
        summary.matches_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
