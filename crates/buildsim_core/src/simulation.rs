//! Core simulation loop.
//!
//! [`simulate`] replays a chromosome against a fresh [`State`] and reduces
//! the result to a fitness score. It is the function a genetic-algorithm
//! fitness evaluation calls for every candidate build order.
//!
//! # Tick order
//!
//! Each tick runs these phases in this order:
//!
//! 1. [`gather`] accrues income from assigned workers
//! 2. [`advance`] counts down training and construction
//! 3. [`apply_action`] attempts the tick's decoded action
//! 4. a [`TickRecord`] is appended to the trace
//! 5. `state.time` advances by one tick
//!
//! After the last tick the final state is scored and a [`SummaryRecord`] is
//! appended.
//!
//! # Determinism
//!
//! There is no randomness and no unordered iteration anywhere in the loop:
//! identical chromosomes and constants always produce identical reports.
//!
//! # Example
//!
//! ```
//! use buildsim_core::data::Constants;
//! use buildsim_core::simulation::simulate;
//!
//! let constants = Constants::new(10.0)
//!     .with_gather_rate("food", 1.0)
//!     .with_initial("villagers", 1.0)
//!     .with_weight("food", 1.0);
//!
//! // assign_food, then idle for two ticks
//! let report = simulate(&[2, 0, 0], &constants).unwrap();
//! assert_eq!(report.fitness, 20.0);
//! assert_eq!(report.trace.len(), 4);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::actions::{apply_action, Action, ActionOutcome};
use crate::data::Constants;
use crate::economy::{gather, Income};
use crate::error::Result;
use crate::fitness::score;
use crate::genes::decode_chromosome;
use crate::production::advance;
use crate::state::State;
use crate::trace::{SummaryRecord, TickRecord, TraceEntry};

/// Outcome of simulating one chromosome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Fitness of the final state. Higher is better.
    pub fitness: f64,
    /// One record per tick followed by a summary record.
    pub trace: Vec<TraceEntry>,
    /// State after the last tick.
    pub final_state: State,
}

/// Run the three state phases of one tick: gather, advance, then act.
///
/// Neither the trace record nor the clock is touched; [`simulate`] does both
/// after this returns.
pub fn step(state: &mut State, action: Action, constants: &Constants) -> (Income, ActionOutcome) {
    let income = gather(state, constants);
    advance(state, constants);
    let outcome = apply_action(state, action, constants);
    (income, outcome)
}

/// Run a chromosome through the simulation.
///
/// The whole chromosome is decoded before the first tick, so an invalid gene
/// aborts the run without simulating anything.
///
/// # Errors
///
/// Returns [`crate::error::SimError::UnknownGene`] if any gene is outside the
/// decode table.
pub fn simulate(chromosome: &[i32], constants: &Constants) -> Result<SimulationReport> {
    let genes = decode_chromosome(chromosome)?;
    let mut state = State::from_constants(constants);
    let mut trace_entries = Vec::with_capacity(genes.len() + 1);

    for (tick, gene) in genes.iter().enumerate() {
        let (income, outcome) = step(&mut state, gene.action, constants);

        if !outcome.success {
            debug!(tick, action = %gene.action, reason = %outcome.reason, "Action rejected");
        }
        trace!(
            tick,
            food = state.food,
            wood = state.wood,
            villagers = state.villagers,
            "Tick complete"
        );

        #[cfg(feature = "debug-validation")]
        debug_assert!(
            state.workers_balanced(),
            "villager pools out of balance at tick {tick}: {state:?}"
        );

        trace_entries.push(TraceEntry::Tick(TickRecord::capture(
            tick,
            gene.action,
            &outcome,
            income,
            &state,
        )));

        state.time += constants.tick_seconds;
    }

    let fitness = score(&state, constants);
    trace_entries.push(TraceEntry::Summary(SummaryRecord::capture(genes.len(), &state)));

    debug!(
        ticks = genes.len(),
        fitness,
        villagers = state.villagers,
        tc_idle_time = state.tc_idle_time,
        pop_block_time = state.pop_block_time,
        "Simulation finished"
    );

    Ok(SimulationReport {
        fitness,
        trace: trace_entries,
        final_state: state,
    })
}
