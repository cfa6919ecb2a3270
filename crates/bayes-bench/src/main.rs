use std::path::PathBuf;

use clap::Parser;

use bayes_bench::config::{QueryConfig, ResolvedOutputs};
use bayes_bench::logging::init_logging;
use bayes_bench::runner::QueryRunner;

/// Sampling-based inference harness for Bayesian networks.
#[derive(Debug, Parser)]
#[command(
    name = "bayes-bench",
    author,
    version,
    about = "Deterministic rejection-sampling query runner"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/query.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of samples to draw.
    #[arg(long, value_name = "SAMPLES")]
    samples: Option<usize>,

    /// Override the RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no query is run).
    #[arg(long)]
    validate_only: bool,

    /// Log every event state after the query regardless of config.
    #[arg(long)]
    log_state_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = QueryConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(samples) = cli.samples {
        config.sampling.samples = samples;
    }

    if let Some(seed) = cli.seed {
        config.sampling.seed = Some(seed);
    }

    if cli.log_state_details {
        config.logging.state_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let event_count = config.network.events.len();
    let samples = config.sampling.samples;

    println!(
        "Loaded configuration '{run_id}' with {event_count} event{} ({samples} samples)",
        if event_count == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = QueryRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: query execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!("{}", summary.outcome);
    println!("Seed {} · {:.1} ms", summary.seed, summary.elapsed_ms);
    if let Some(path) = summary.summary_path.as_ref() {
        println!("Summary (JSON): {}", path.display());
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
