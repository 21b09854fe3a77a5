//! Final-state scoring.

use crate::data::Constants;
use crate::state::State;

/// Score a final state. Higher is better; there is no upper bound.
///
/// ```text
/// fitness = w.villagers * villagers + w.food * food + w.wood * wood
///         - p.tc_idle_per_sec * tc_idle_time
///         - p.pop_block_per_sec * pop_block_time
/// ```
///
/// Missing weights and penalties count as zero.
#[must_use]
pub fn score(state: &State, constants: &Constants) -> f64 {
    constants.weight("villagers") * f64::from(state.villagers)
        + constants.weight("food") * state.food
        + constants.weight("wood") * state.wood
        - constants.penalty("tc_idle_per_sec") * state.tc_idle_time
        - constants.penalty("pop_block_per_sec") * state.pop_block_time
}
