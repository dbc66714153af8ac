use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use f1_pipeline::comparison::compare_drivers;
use f1_pipeline::config::DnfStatusCatalog;
use f1_pipeline::error::Result;
use f1_pipeline::logging;
use f1_pipeline::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "f1_pipeline")]
#[command(about = "Formula 1 season data cleaning, join and aggregation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory containing the source CSV tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Optional TOML file overriding the compiled-in DNF status catalog
    #[arg(long)]
    dnf_statuses: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the output artifacts as CSV
    Clean {
        /// Directory for merged_results.csv, driver_stats.csv and
        /// constructor_stats.csv
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Compare two drivers by display name
    Compare {
        /// First driver, e.g. "Charles Leclerc"
        driver1: String,
        /// Second driver, e.g. "Lando Norris"
        driver2: String,
    },
    /// Print the top summary rows per driver and constructor
    Stats {
        /// Number of rows to show per table
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn build_pipeline(dnf_statuses: Option<&PathBuf>) -> Result<Pipeline> {
    let catalog = match dnf_statuses {
        Some(path) => {
            let catalog = DnfStatusCatalog::load(path)?;
            info!(version = %catalog.version, statuses = catalog.len(), "Loaded DNF status catalog override");
            catalog
        }
        None => DnfStatusCatalog::default_catalog().clone(),
    };
    Ok(Pipeline::new(catalog))
}

fn run(cli: Cli) -> Result<()> {
    let pipeline = build_pipeline(cli.dnf_statuses.as_ref())?;

    match cli.command {
        Commands::Clean { output_dir } => {
            println!("🔄 Running full pipeline...");
            let output = pipeline.run(&cli.data_dir)?;
            let artifacts = output.write_csv(&output_dir)?;

            println!("\n📊 Pipeline Results:");
            println!("   Merged rows: {}", output.merged.rows.len());
            println!("   Drivers: {}", output.driver_stats.len());
            println!("   Constructors: {}", output.constructor_stats.len());
            match &output.tables.pitstops {
                Some(stops) => println!("   Pit stops: {}", stops.len()),
                None => println!("   Pit stops: unavailable (pitstops.csv not present)"),
            }
            match &output.tables.laptimes {
                Some(laps) => println!("   Lap times: {}", laps.len()),
                None => println!("   Lap times: unavailable (laptimes.csv not present)"),
            }
            println!("   Merged output: {}", artifacts.merged.display());
            println!("   Driver stats: {}", artifacts.driver_stats.display());
            println!(
                "   Constructor stats: {}",
                artifacts.constructor_stats.display()
            );
        }
        Commands::Compare { driver1, driver2 } => {
            println!("⚔️  Comparing {} vs {}...", driver1, driver2);
            let output = pipeline.run(&cli.data_dir)?;
            let comparison = compare_drivers(&output, &driver1, &driver2)?;
            comparison.print_report();
        }
        Commands::Stats { top } => {
            println!("📈 Computing summary tables...");
            let output = pipeline.run(&cli.data_dir)?;

            println!("\nTop drivers by total points:");
            let mut drivers = output.driver_stats.clone();
            drivers.sort_by(|a, b| {
                b.total_points
                    .partial_cmp(&a.total_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for stats in drivers.iter().take(top) {
                println!(
                    "   {:30} races={:4} wins={:3} podiums={:3} points={:8.1} win_rate={:5.1}%",
                    stats.full_name.as_deref().unwrap_or(&stats.driver_id),
                    stats.races,
                    stats.wins,
                    stats.podiums,
                    stats.total_points,
                    stats.win_rate * 100.0
                );
            }

            println!("\nTop constructors by total points:");
            let mut constructors = output.constructor_stats.clone();
            constructors.sort_by(|a, b| {
                b.total_points
                    .partial_cmp(&a.total_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for stats in constructors.iter().take(top) {
                println!(
                    "   {:30} races={:4} wins={:3} podiums={:3} points={:8.1} win_rate={:5.1}%",
                    stats.name.as_deref().unwrap_or(&stats.constructor_id),
                    stats.races,
                    stats.wins,
                    stats.podiums,
                    stats.total_points,
                    stats.win_rate * 100.0
                );
            }
        }
    }
    Ok(())
}

fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("Pipeline failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
