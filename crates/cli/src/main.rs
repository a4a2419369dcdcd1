//! Arealis CLI - spatial autocorrelation for areal data

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use arealis_algorithms::analysis::{moran_analysis, MoranAnalysisParams, Observations};
use arealis_algorithms::contiguity::queen_weights;
use arealis_algorithms::moran::{global_morans_i, MoranParams};
use arealis_core::io::read_geojson;
use arealis_core::RegionTable;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "arealis")]
#[command(author, version, about = "Spatial autocorrelation statistics for areal data", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a region file
    Info {
        /// Input GeoJSON file
        input: PathBuf,
        /// Property to use as the region id (defaults to the feature id)
        #[arg(long)]
        id_field: Option<String>,
    },
    /// Global Moran's I permutation test
    Global {
        /// Input GeoJSON file
        input: PathBuf,
        /// Attribute field to test
        #[arg(short, long)]
        field: Option<String>,
        /// Event-count field (rate mode; requires --population)
        #[arg(long)]
        events: Option<String>,
        /// Population-at-risk field (rate mode; requires --events)
        #[arg(long)]
        population: Option<String>,
        /// Number of permutations
        #[arg(short, long, default_value = "9999")]
        permutations: usize,
        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Property to use as the region id
        #[arg(long)]
        id_field: Option<String>,
    },
    /// Local Moran's I (LISA) with cluster labels
    Local {
        /// Input GeoJSON file
        input: PathBuf,
        /// Attribute field to test
        #[arg(short, long)]
        field: Option<String>,
        /// Event-count field (rate mode; requires --population)
        #[arg(long)]
        events: Option<String>,
        /// Population-at-risk field (rate mode; requires --events)
        #[arg(long)]
        population: Option<String>,
        /// Number of permutations
        #[arg(short, long, default_value = "9999")]
        permutations: usize,
        /// Significance threshold for cluster labels
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,
        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Property to use as the region id
        #[arg(long)]
        id_field: Option<String>,
        /// Write full per-region results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Full analysis: weights, lag, global + local Moran, cluster labels
    Analyze {
        /// Input GeoJSON file
        input: PathBuf,
        /// Attribute field to test
        #[arg(short, long)]
        field: Option<String>,
        /// Event-count field (rate mode; requires --population)
        #[arg(long)]
        events: Option<String>,
        /// Population-at-risk field (rate mode; requires --events)
        #[arg(long)]
        population: Option<String>,
        /// Number of permutations
        #[arg(short, long, default_value = "9999")]
        permutations: usize,
        /// Significance threshold for cluster labels
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,
        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Property to use as the region id
        #[arg(long)]
        id_field: Option<String>,
        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_table(path: &PathBuf, id_field: Option<&str>) -> Result<RegionTable> {
    let pb = spinner("Reading regions...");
    let table = read_geojson(path, id_field)
        .with_context(|| format!("failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} regions", table.len());
    Ok(table)
}

/// Resolve the observation source from the flag combination.
fn observations(
    field: Option<String>,
    events: Option<String>,
    population: Option<String>,
) -> Result<Observations> {
    match (field, events, population) {
        (None, Some(events), Some(population)) => Ok(Observations::Rate { events, population }),
        (Some(field), None, None) => Ok(Observations::Column { field }),
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
            bail!("--field conflicts with --events/--population; pick one mode")
        }
        (_, Some(_), None) | (_, None, Some(_)) => {
            bail!("rate mode needs both --events and --population")
        }
        (None, None, None) => bail!("supply --field, or --events with --population"),
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(file, value).context("failed to write JSON")?;
            println!("Results saved to: {}", path.display());
        }
        None => {
            let text = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
            println!("{text}");
        }
    }
    Ok(())
}

// ─── Subcommand handlers ────────────────────────────────────────────────

fn run_info(input: &PathBuf, id_field: Option<&str>) -> Result<()> {
    let table = read_table(input, id_field)?;

    println!("Regions:   {}", table.len());
    println!("Fields:    {}", table.fields().join(", "));

    let pb = spinner("Building Queen contiguity weights...");
    let weights = queen_weights(&table)?;
    pb.finish_and_clear();

    let cardinalities: Vec<usize> = (0..weights.n()).map(|i| weights.cardinality(i)).collect();
    let max = cardinalities.iter().max().copied().unwrap_or(0);
    let mean = if weights.n() > 0 {
        cardinalities.iter().sum::<usize>() as f64 / weights.n() as f64
    } else {
        0.0
    };
    println!("Neighbors: mean {mean:.2}, max {max}");

    let islands = weights.islands();
    if islands.is_empty() {
        println!("Islands:   none");
    } else {
        let ids: Vec<String> = islands
            .iter()
            .filter_map(|&i| table.get(i).map(|r| r.id.clone()))
            .collect();
        warn!("{} island region(s): {}", islands.len(), ids.join(", "));
        println!("Islands:   {}", ids.join(", "));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_global(
    input: &PathBuf,
    field: Option<String>,
    events: Option<String>,
    population: Option<String>,
    permutations: usize,
    seed: Option<u64>,
    id_field: Option<&str>,
) -> Result<()> {
    let start = Instant::now();
    let table = read_table(input, id_field)?;
    let obs = observations(field, events, population)?;

    let y = match &obs {
        Observations::Column { field } => table.column(field)?,
        Observations::Rate { events, population } => {
            let events = table.column(events)?;
            let population = table.column(population)?;
            arealis_algorithms::rates::empirical_bayes_rates(&events, &population)?
        }
    };

    let pb = spinner("Building Queen contiguity weights...");
    let weights = queen_weights(&table)?;
    pb.finish_and_clear();
    warn_islands(&weights, &table);

    let pb = spinner("Running permutation test...");
    let result = global_morans_i(&y, &weights, &MoranParams { permutations, seed })?;
    pb.finish_and_clear();

    println!("Moran's I:  {:.6}", result.i);
    println!("Expected:   {:.6}", result.expected_i);
    println!("p (sim):    {:.6}  ({} permutations)", result.p_sim, permutations);
    println!("  Processing time: {:.2?}", start.elapsed());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_analysis(
    input: &PathBuf,
    field: Option<String>,
    events: Option<String>,
    population: Option<String>,
    permutations: usize,
    alpha: f64,
    seed: Option<u64>,
    id_field: Option<&str>,
    output: Option<&PathBuf>,
    summary: bool,
) -> Result<()> {
    let start = Instant::now();
    let table = read_table(input, id_field)?;

    let params = MoranAnalysisParams {
        observations: observations(field, events, population)?,
        permutations,
        alpha,
        seed,
    };

    let pb = spinner("Running Moran analysis...");
    let result = moran_analysis(&table, &params)?;
    pb.finish_and_clear();

    if !result.islands.is_empty() {
        warn!(
            "{} island region(s) excluded from inference",
            result.islands.len()
        );
    }

    if summary {
        println!("Moran's I:  {:.6}", result.global_i);
        println!("Expected:   {:.6}", result.expected_i);
        println!("p (sim):    {:.6}  ({permutations} permutations)", result.p_global);
        println!("Clusters (alpha = {alpha}):");
        for label in [
            "Q1: (+, +)",
            "Q2: (-, +)",
            "Q3: (-, -)",
            "Q4: (+, -)",
            "No Significance",
            "Undefined",
        ] {
            let count = result.labels.iter().filter(|l| l.as_str() == label).count();
            if count > 0 {
                println!("  {label:<16} {count}");
            }
        }
    }

    if output.is_some() || !summary {
        write_json(&result, output)?;
    }
    println!("  Processing time: {:.2?}", start.elapsed());
    Ok(())
}

fn warn_islands(weights: &arealis_core::SpatialWeights, table: &RegionTable) {
    let islands = weights.islands();
    if !islands.is_empty() {
        let ids: Vec<String> = islands
            .iter()
            .filter_map(|&i| table.get(i).map(|r| r.id.clone()))
            .collect();
        warn!("{} island region(s): {}", islands.len(), ids.join(", "));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, id_field } => run_info(&input, id_field.as_deref()),
        Commands::Global {
            input,
            field,
            events,
            population,
            permutations,
            seed,
            id_field,
        } => run_global(
            &input,
            field,
            events,
            population,
            permutations,
            seed,
            id_field.as_deref(),
        ),
        Commands::Local {
            input,
            field,
            events,
            population,
            permutations,
            alpha,
            seed,
            id_field,
            output,
        } => run_analysis(
            &input,
            field,
            events,
            population,
            permutations,
            alpha,
            seed,
            id_field.as_deref(),
            output.as_ref(),
            true,
        ),
        Commands::Analyze {
            input,
            field,
            events,
            population,
            permutations,
            alpha,
            seed,
            id_field,
            output,
        } => run_analysis(
            &input,
            field,
            events,
            population,
            permutations,
            alpha,
            seed,
            id_field.as_deref(),
            output.as_ref(),
            false,
        ),
    }
}
