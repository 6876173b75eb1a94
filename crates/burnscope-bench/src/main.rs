use std::path::PathBuf;

use clap::Parser;

use burnscope_bench::config::BenchmarkConfig;
use burnscope_bench::logging::init_logging;
use burnscope_bench::simulation::SimulationRunner;

/// Scores burn-estimation engine variants against simulated shoes with known burns.
#[derive(Debug, Parser)]
#[command(
    name = "burnscope-bench",
    author,
    version,
    about = "Deterministic burn-estimation benchmark harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of simulated sessions.
    #[arg(long, value_name = "SESSIONS")]
    sessions: Option<usize>,

    /// Override the RNG seed for shoe generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the Monte Carlo trial count for variants that enable it.
    #[arg(long, value_name = "TRIALS")]
    trials: Option<u32>,

    /// Exit after validating the configuration.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(sessions) = cli.sessions {
        config.simulation.sessions = sessions;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(trials) = cli.trials {
        config.simulation.monte_carlo_trials = trials;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let engine_count = config.engines.len();
    let sessions = config.simulation.sessions;

    println!(
        "Loaded configuration '{run_id}' with {engine_count} engine variant{} ({sessions} sessions, {} decks)",
        if engine_count == 1 { "" } else { "s" },
        config.simulation.decks
    );

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let summary = SimulationRunner::new(config, outputs).run()?;

    println!(
        "Run complete for '{run_id}': {} sessions × {} engines → {} rows at {}",
        summary.sessions,
        summary.engines,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", path.display());
    }

    Ok(())
}
