use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yucca::{
    engine::ExperimentRunner,
    rainfall::{load_rainfall, RainfallStatistics},
    report::ExperimentResult,
    rng::RngManager,
    SimulationConfig,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Joshua tree population simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/mojave.yaml")]
    scenario: PathBuf,

    /// Rainfall CSV (overrides the scenario's rainfall_csv)
    #[arg(long)]
    rainfall: Option<PathBuf>,

    /// Override the number of trials
    #[arg(long)]
    trials: Option<usize>,

    /// Override the simulated years per trial
    #[arg(long)]
    years: Option<u32>,

    /// Override the master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Histogram bin count
    #[arg(long, default_value_t = 10)]
    bins: usize,

    /// Print the result as JSON instead of a histogram
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::load_from_path(&cli.scenario)
        .with_context(|| format!("Failed to load scenario {}", cli.scenario.display()))?;
    if let Some(path) = cli.rainfall {
        config.rainfall_csv = path;
    }
    if let Some(trials) = cli.trials {
        config.experiment.trials = trials;
    }
    if let Some(years) = cli.years {
        config.experiment.years = years;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .with_context(|| format!("Invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let observations = load_rainfall(&config.rainfall_csv)?;
    let stats = RainfallStatistics::from_observations(&observations).with_context(|| {
        format!(
            "No usable rainfall data in {}",
            config.rainfall_csv.display()
        )
    })?;

    let runner = ExperimentRunner::from_config(&config, stats)?;
    let final_sizes = runner.run(&RngManager::new(config.seed));

    let experiment = runner.experiment();
    let result = ExperimentResult::new(
        config.name.clone(),
        config.seed,
        experiment.years,
        experiment.mature_trees,
        stats,
        final_sizes,
        cli.bins,
    );
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.render());
    }
    Ok(())
}
