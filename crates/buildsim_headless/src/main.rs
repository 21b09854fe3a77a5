//! Headless build-order runner.
//!
//! Scores chromosomes against balance constants without any UI. Designed for
//! genetic-algorithm drivers, CI determinism checks and balance tuning.
//!
//! # Usage
//!
//! ```bash
//! # Score a single chromosome and print its trace
//! cargo run -p buildsim_headless -- run --chromosome "2,2,3,1,0,6" --pretty
//!
//! # Score a population in parallel
//! cargo run -p buildsim_headless -- batch --population pop.txt --output results/batch.json
//!
//! # Verify a chromosome replays identically
//! cargo run -p buildsim_headless -- verify --chromosome "1,2,0,0,0" --runs 10
//!
//! # Validate constants files
//! cargo run -p buildsim_headless -- validate assets/data
//! ```
//!
//! Output (stdout): JSON reports
//! Logs (stderr): Debug information

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use buildsim_core::data::Constants;
use buildsim_core::genes::{parse_chromosome, GeneAction};
use buildsim_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    constants_loader::{default_constants_path, load_constants_file},
    population::load_population,
    runner::run_chromosome,
    validate::validate_path,
};

#[derive(Parser)]
#[command(name = "buildsim_headless")]
#[command(about = "Headless build-order simulator for GA scoring and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one chromosome and print its report as JSON
    Run {
        /// Constants file (.ron, .yaml, .yml, .json)
        #[arg(short, long)]
        constants: Option<PathBuf>,

        /// Genes separated by commas or whitespace
        #[arg(long)]
        chromosome: String,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Score every chromosome of a population in parallel
    Batch {
        /// Constants file (.ron, .yaml, .yml, .json)
        #[arg(short, long)]
        constants: Option<PathBuf>,

        /// Population file (JSON array or one chromosome per line)
        #[arg(long)]
        population: PathBuf,

        /// Maximum parallel simulations (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running the same chromosome multiple times
    Verify {
        /// Constants file (.ron, .yaml, .yml, .json)
        #[arg(short, long)]
        constants: Option<PathBuf>,

        /// Genes separated by commas or whitespace
        #[arg(long)]
        chromosome: String,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Validate constants files
    Validate {
        /// Constants file or directory of constants files
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Print the gene decode table
    Genes,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            constants,
            chromosome,
            pretty,
        } => cmd_run(constants, &chromosome, pretty),
        Commands::Batch {
            constants,
            population,
            parallel,
            output,
        } => cmd_batch(constants, population, parallel, output),
        Commands::Verify {
            constants,
            chromosome,
            runs,
        } => cmd_verify(constants, &chromosome, runs),
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Genes => cmd_genes(),
    }
}

/// Log a fatal error and exit with status 1.
fn fail(message: &str) -> ! {
    tracing::error!("{message}");
    std::process::exit(1);
}

/// Resolve the constants path from the flag or the default locations.
fn resolve_constants_path(flag: Option<PathBuf>) -> PathBuf {
    match flag.or_else(default_constants_path) {
        Some(path) => path,
        None => fail("No constants file given and assets/data/constants.ron not found"),
    }
}

fn load_constants_or_exit(path: &Path) -> Constants {
    match load_constants_file(path) {
        Ok(constants) => constants,
        Err(e) => fail(&e.to_string()),
    }
}

fn parse_chromosome_or_exit(text: &str) -> Vec<i32> {
    match parse_chromosome(text) {
        Ok(genes) => genes,
        Err(e) => fail(&format!("Invalid chromosome: {e}")),
    }
}

/// Simulate one chromosome
fn cmd_run(constants: Option<PathBuf>, chromosome: &str, pretty: bool) {
    let constants_path = resolve_constants_path(constants);
    let constants = load_constants_or_exit(&constants_path);
    let genes = parse_chromosome_or_exit(chromosome);

    let report = match run_chromosome(&genes, &constants) {
        Ok(report) => report,
        Err(e) => fail(&e.to_string()),
    };

    match report.to_json(pretty) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("Failed to serialize report: {e}")),
    }
}

/// Score a population
fn cmd_batch(
    constants: Option<PathBuf>,
    population: PathBuf,
    parallel: u32,
    output: Option<PathBuf>,
) {
    let constants_path = resolve_constants_path(constants);
    let constants = load_constants_or_exit(&constants_path);
    let chromosomes = match load_population(&population) {
        Ok(chromosomes) => chromosomes,
        Err(e) => fail(&e.to_string()),
    };

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        constants = %constants_path.display(),
        population = %population.display(),
        chromosomes = chromosomes.len(),
        parallel,
        cpus_available = num_cpus,
        "Batch configuration"
    );

    let mut config = BatchConfig::new(constants_path, population).with_parallel(parallel);
    if let Some(path) = output.clone() {
        config = config.with_output(path);
    }

    let results = run_batch(config, &constants, &chromosomes);

    match output {
        Some(path) => {
            if let Err(e) = results.save(&path) {
                fail(&format!("Failed to save results to '{}': {e}", path.display()));
            }
            eprintln!("Results saved to: {}", path.display());
        }
        None => match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("Failed to serialize results: {e}")),
        },
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!(
        "Scored: {}/{}",
        results.summary.scored, results.summary.count
    );
    if let (Some(best), Some(index)) = (results.summary.best, results.summary.best_index) {
        eprintln!("Best:   {best:.3} (chromosome {index})");
    }
    if let Some(mean) = results.summary.mean {
        eprintln!("Mean:   {mean:.3}");
    }
    if let Some(worst) = results.summary.worst {
        eprintln!("Worst:  {worst:.3}");
    }
    eprintln!("Duration: {:.2}s", results.duration_seconds);

    if !results.errors.is_empty() {
        eprintln!("\nFAILED CHROMOSOMES:");
        for error in results.errors.iter().take(10) {
            eprintln!("  #{}: {}", error.index, error.message);
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }
}

/// Verify determinism
fn cmd_verify(constants: Option<PathBuf>, chromosome: &str, runs: u32) {
    let constants_path = resolve_constants_path(constants);
    let constants = load_constants_or_exit(&constants_path);
    let genes = parse_chromosome_or_exit(chromosome);

    tracing::info!(
        "Verifying determinism: {} genes ({} runs)",
        genes.len(),
        runs
    );

    let outcome = verify_determinism(&genes, &constants, runs);

    if outcome.is_deterministic() {
        eprintln!("PASS: All {runs} runs produced identical results");
        if let Some(fitness) = outcome.fitness {
            eprintln!("  Fitness: {fitness}");
        }
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        if let Some(run) = outcome.divergent_run {
            eprintln!("  First divergent run: {run}");
        }
        if let Some(entry) = outcome.divergent_entry {
            eprintln!("  First divergent trace entry: {entry}");
        }
        std::process::exit(1);
    }
}

/// Validate constants files
fn cmd_validate(path: &Path) {
    tracing::info!("Validating constants in: {}", path.display());

    let report = match validate_path(path) {
        Ok(report) => report,
        Err(e) => fail(&format!("Validation failed: {e}")),
    };

    for issue in &report.issues {
        eprintln!("  {issue}");
    }

    if report.is_ok() {
        tracing::info!("Validation passed ({} files)", report.files_checked.len());
    } else {
        tracing::error!(
            "Validation failed: {} issue(s) in {} file(s)",
            report.issues.len(),
            report.files_checked.len()
        );
        std::process::exit(1);
    }
}

/// Print the gene decode table
fn cmd_genes() {
    for gene in GeneAction::all() {
        println!("{gene}");
    }
}
