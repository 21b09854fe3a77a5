//! Batch population scoring.
//!
//! Scores every chromosome of a population in parallel using rayon. Each
//! simulation owns its state and reads the shared constants, so no locking
//! is needed beyond the progress counter.

use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use buildsim_core::data::Constants;
use buildsim_core::simulation::{simulate, SimulationReport};
use buildsim_core::trace::first_difference;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Constants file the population was scored against
    pub constants_path: PathBuf,
    /// Population file
    pub population_path: PathBuf,
    /// Maximum parallel simulations (0 = use rayon default)
    pub parallel: u32,
    /// Where to write results (None = stdout)
    pub output: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            constants_path: PathBuf::from("assets/data/constants.ron"),
            population_path: PathBuf::from("assets/populations/sample.json"),
            parallel: 0,
            output: None,
        }
    }
}

impl BatchConfig {
    /// Create a new batch config
    pub fn new(constants_path: impl Into<PathBuf>, population_path: impl Into<PathBuf>) -> Self {
        Self {
            constants_path: constants_path.into(),
            population_path: population_path.into(),
            ..Default::default()
        }
    }

    /// Set the thread count
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the output file
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }
}

/// Aggregate statistics over the successfully scored chromosomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Chromosomes in the population
    pub count: usize,
    /// Chromosomes that produced a fitness
    pub scored: usize,
    /// Highest fitness
    pub best: Option<f64>,
    /// Index of the highest fitness (lowest index on ties)
    pub best_index: Option<usize>,
    /// Lowest fitness
    pub worst: Option<f64>,
    /// Mean fitness
    pub mean: Option<f64>,
}

impl BatchSummary {
    /// Summarize per-chromosome fitness, skipping failed chromosomes.
    pub fn from_fitness(fitness: &[Option<f64>]) -> Self {
        let scored: Vec<(usize, f64)> = fitness
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.map(|f| (i, f)))
            .collect();

        if scored.is_empty() {
            return Self {
                count: fitness.len(),
                ..Default::default()
            };
        }

        let (best_index, best) = scored
            .iter()
            .copied()
            .fold((usize::MAX, f64::NEG_INFINITY), |acc, (i, f)| {
                if f > acc.1 {
                    (i, f)
                } else {
                    acc
                }
            });
        let worst = scored.iter().map(|&(_, f)| f).fold(f64::INFINITY, f64::min);
        let mean = scored.iter().map(|&(_, f)| f).sum::<f64>() / scored.len() as f64;

        Self {
            count: fitness.len(),
            scored: scored.len(),
            best: Some(best),
            best_index: Some(best_index),
            worst: Some(worst),
            mean: Some(mean),
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Fitness per chromosome, in input order (None = failed)
    pub fitness: Vec<Option<f64>>,
    /// Indices of scored chromosomes, best first (stable by index on ties)
    pub ranking: Vec<usize>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Chromosome indices with their fitness, best first.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.ranking
            .iter()
            .filter_map(|&i| self.fitness.get(i).copied().flatten().map(|f| (i, f)))
    }
}

/// Error scoring one chromosome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Chromosome index
    pub index: usize,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total chromosomes
    pub total: u32,
    /// Completed chromosomes
    pub completed: AtomicU32,
    /// Start time
    pub start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed chromosome and return the new count
    pub fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        self.current() as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_item = elapsed.as_secs_f64() / completed as f64;
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_item * remaining as f64)
    }
}

/// Rank scored chromosomes by fitness, best first.
///
/// Ties keep input order. Failed chromosomes are left out.
pub fn rank(fitness: &[Option<f64>]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..fitness.len()).filter(|&i| fitness[i].is_some()).collect();
    ranking.sort_by(|&a, &b| {
        let (fa, fb) = (fitness[a].unwrap_or(f64::NAN), fitness[b].unwrap_or(f64::NAN));
        fb.partial_cmp(&fa).unwrap_or(CmpOrdering::Equal)
    });
    ranking
}

/// Score a population in parallel.
///
/// An unknown gene fails only its own chromosome; the rest are still scored.
pub fn run_batch(config: BatchConfig, constants: &Constants, population: &[Vec<i32>]) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(population.len() as u32);

    info!(
        "Starting batch run: {} chromosomes against {:?}",
        population.len(),
        config.constants_path
    );

    let score_all = || -> Vec<Result<f64, BatchError>> {
        population
            .par_iter()
            .enumerate()
            .map(|(index, chromosome)| {
                let result = simulate(chromosome, constants)
                    .map(|report| report.fitness)
                    .map_err(|e| {
                        warn!("Chromosome {} failed: {}", index, e);
                        BatchError {
                            index,
                            message: e.to_string(),
                        }
                    });

                let completed = progress.record_completion();
                if completed % 100 == 0 {
                    debug!(
                        "Progress: {}/{} ({:.0}%, eta {:.1}s)",
                        completed,
                        progress.total,
                        progress.percentage(),
                        progress.eta().as_secs_f64()
                    );
                }
                result
            })
            .collect()
    };

    // A dedicated pool when a thread count is requested
    let results = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
        {
            Ok(pool) => pool.install(score_all),
            Err(e) => {
                warn!("Failed to build thread pool: {}, using global pool", e);
                score_all()
            }
        }
    } else {
        score_all()
    };

    let mut fitness = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(f) => fitness.push(Some(f)),
            Err(e) => {
                fitness.push(None);
                errors.push(e);
            }
        }
    }

    let ranking = rank(&fitness);
    let summary = BatchSummary::from_fitness(&fitness);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} scored, {} failed in {:.2}s",
        summary.scored,
        errors.len(),
        duration_seconds
    );

    BatchResults {
        config,
        fitness,
        ranking,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of replaying one chromosome several times.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyOutcome {
    /// Runs performed
    pub runs: u32,
    /// Fitness of the first run
    pub fitness: Option<f64>,
    /// First run index that differed from run 0
    pub divergent_run: Option<u32>,
    /// First trace entry that differed in that run
    pub divergent_entry: Option<usize>,
}

impl VerifyOutcome {
    /// Whether every run matched the first.
    pub fn is_deterministic(&self) -> bool {
        self.divergent_run.is_none()
    }
}

/// Verify determinism by running the same chromosome multiple times
///
/// Every run is compared with the first on fitness, final state and trace.
/// A chromosome that fails to decode must fail identically every time.
pub fn verify_determinism(chromosome: &[i32], constants: &Constants, runs: u32) -> VerifyOutcome {
    let baseline = simulate(chromosome, constants);

    for run in 1..runs {
        let again = simulate(chromosome, constants);
        if again == baseline {
            continue;
        }
        let divergent_entry = match (&baseline, &again) {
            (Ok(SimulationReport { trace: a, .. }), Ok(SimulationReport { trace: b, .. })) => {
                first_difference(a, b)
            }
            _ => None,
        };
        warn!(run, ?divergent_entry, "Run diverged from baseline");
        return VerifyOutcome {
            runs,
            fitness: baseline.as_ref().ok().map(|r| r.fitness),
            divergent_run: Some(run),
            divergent_entry,
        };
    }

    VerifyOutcome {
        runs,
        fitness: baseline.as_ref().ok().map(|r| r.fitness),
        divergent_run: None,
        divergent_entry: None,
    }
}
