//! Single-chromosome runs.

use buildsim_core::data::Constants;
use buildsim_core::error::Result;
use buildsim_core::simulation::simulate;
use buildsim_core::trace::TraceEntry;
use serde::{Deserialize, Serialize};

/// Report printed by the `run` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Chromosome that was simulated.
    pub chromosome: Vec<i32>,
    /// Fitness of the final state.
    pub fitness: f64,
    /// Per-tick records followed by the summary record.
    pub trace: Vec<TraceEntry>,
}

impl RunReport {
    /// Render the report as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Simulate one chromosome and package the result.
///
/// # Errors
///
/// Returns [`buildsim_core::error::SimError::UnknownGene`] for a gene outside
/// the decode table.
pub fn run_chromosome(chromosome: &[i32], constants: &Constants) -> Result<RunReport> {
    let report = simulate(chromosome, constants)?;
    tracing::info!(
        ticks = chromosome.len(),
        fitness = report.fitness,
        villagers = report.final_state.villagers,
        "Run complete"
    );
    Ok(RunReport {
        chromosome: chromosome.to_vec(),
        fitness: report.fitness,
        trace: report.trace,
    })
}
