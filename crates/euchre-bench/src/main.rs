use std::path::PathBuf;

use clap::Parser;

use euchre_bench::config::{BenchmarkConfig, ResolvedOutputs};
use euchre_bench::logging::init_logging;
use euchre_bench::rollout::RolloutRunner;

/// Determinization rollout harness for the Euchre engine.
#[derive(Debug, Parser)]
#[command(
    name = "euchre-bench",
    author,
    version,
    about = "Seeded Euchre rollouts that exercise the determinizer"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of hands to play.
    #[arg(long, value_name = "HANDS")]
    hands: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no hands are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(hands) = cli.hands {
        config.deals.hands = hands;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let hands = config.deals.hands;
    let samples = config.rollouts.determinizations_per_decision;

    println!(
        "Loaded configuration '{run_id}' ({hands} hand{}, {samples} determinization{} per decision)",
        if hands == 1 { "" } else { "s" },
        if samples == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = RolloutRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: rollouts skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Rollouts complete for '{run_id}': {} hands, {} rows at {}",
        summary.hands_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "  Wins: North/South {}, East/West {}",
        summary.team_wins[0], summary.team_wins[1]
    );
    println!(
        "  Determinizations: {} ({} failed)",
        summary.determinizations, summary.failures
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
