use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use zombies::ensemble::{replicate_seeds, run_replicates};
use zombies::{ConversionEdge, EnsembleStats, RunSummary, Simulation, SimulationConfig, TickStats};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML or JSON). If not specified, searches for config.yaml, config.yml, or config.json in current directory.
    #[arg(short, long)]
    config: Option<String>,

    /// Random seed (overrides the config file; random if neither sets one)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of ticks to run (overrides the config file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Number of independent runs (at least 1), seeded consecutively and run in parallel
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    replicates: u64,

    /// Write a JSON report of the run(s) to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    summary: RunSummary,
    history: &'a [TickStats],
    infections: &'a [ConversionEdge],
}

#[derive(Serialize)]
struct EnsembleReport {
    stats: EnsembleStats,
    runs: Vec<RunSummary>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);
    config.validate()?;

    info!(
        seed,
        grid_width = config.grid_width,
        grid_height = config.grid_height,
        humans = config.human_count,
        zombies = config.zombie_count,
        max_ticks = config.max_ticks,
        "starting outbreak"
    );

    if args.replicates > 1 {
        run_ensemble(&config, seed, args.replicates as usize, args.report.as_deref())
    } else {
        run_single(config, seed, args.report.as_deref())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Load configuration from file or use default
fn load_config(config_path: Option<&str>) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        // User specified a config file
        SimulationConfig::from_file(path)
            .map_err(|e| format!("Failed to load config from {}: {}", path, e).into())
    } else {
        // Try default paths
        Ok(SimulationConfig::from_default_paths())
    }
}

fn run_single(
    config: SimulationConfig,
    seed: u64,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sim = Simulation::with_config(&mut rng, config)?;
    let summary = sim.run(&mut rng)?;

    info!(
        ticks = summary.ticks_run,
        humans = summary.final_stats.humans,
        zombies = summary.final_stats.zombies,
        conversions = summary.final_stats.total_conversions,
        extinction_tick = ?summary.extinction_tick,
        "outbreak finished"
    );

    if let Some(path) = report {
        let report = RunReport {
            summary,
            history: &sim.history,
            infections: sim.population.network.edges(),
        };
        write_report(path, &report)?;
    }
    Ok(())
}

fn run_ensemble(
    config: &SimulationConfig,
    base_seed: u64,
    replicates: usize,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let seeds = replicate_seeds(base_seed, replicates);
    let runs = run_replicates(config, &seeds)?;
    let stats = EnsembleStats::from_runs(&runs);

    info!(
        runs = stats.runs,
        extinct_runs = stats.extinct_runs,
        mean_final_humans = stats.mean_final_humans,
        mean_final_zombies = stats.mean_final_zombies,
        mean_extinction_tick = ?stats.mean_extinction_tick,
        "ensemble finished"
    );

    if let Some(path) = report {
        write_report(path, &EnsembleReport { stats, runs })?;
    }
    Ok(())
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), report)?;
    info!(path = %path.display(), "report written");
    Ok(())
}
