//! Test fixtures and helpers.
//!
//! Pre-built constants and states for the documented scenarios, so that
//! unit, integration and headless tests all exercise the same numbers.

use buildsim_core::data::{load_constants, Constants, ConstantsFormat};
use buildsim_core::state::State;

/// Balance document matching `assets/data/constants.ron`.
pub const STARTER_CONSTANTS_RON: &str = r#"(
    tick_seconds: 10.0,
    gather_rates: {"food": 0.8, "wood": 0.7},
    actions: {
        "train_villager": {"food_cost": 50.0, "train_time": 20.0},
        "build_house": {"wood_cost": 30.0, "build_time": 30.0, "pop_increase": 5.0},
    },
    initial_state: {
        "villagers": 3.0,
        "idle_villagers": 3.0,
        "food": 200.0,
        "wood": 50.0,
        "population_cap": 5.0,
    },
    penalties: {"tc_idle_per_sec": 0.1, "pop_block_per_sec": 0.5},
    fitness_weights: {"villagers": 1.0, "food": 0.01, "wood": 0.01},
)"#;

/// Parse [`STARTER_CONSTANTS_RON`].
///
/// # Panics
///
/// Panics if the embedded document no longer parses.
#[must_use]
pub fn starter_constants() -> Constants {
    load_constants(STARTER_CONSTANTS_RON, ConstantsFormat::Ron)
        .unwrap_or_else(|e| panic!("starter constants must parse: {e}"))
}

/// One villager with exactly enough food for one training order.
///
/// `tick_seconds=10`, food and wood gather at 1/s, a villager costs 50 food
/// and takes 20s, and the population cap is 4.
#[must_use]
pub fn train_scenario_constants() -> Constants {
    Constants::new(10.0)
        .with_gather_rate("food", 1.0)
        .with_gather_rate("wood", 1.0)
        .with_action_param("train_villager", "food_cost", 50.0)
        .with_action_param("train_villager", "train_time", 20.0)
        .with_initial("villagers", 1.0)
        .with_initial("idle_villagers", 1.0)
        .with_initial("food", 50.0)
        .with_initial("wood", 0.0)
        .with_initial("population_cap", 4.0)
}

/// Houses cost 30 wood, take 10s and add 4 population cap.
#[must_use]
pub fn house_scenario_constants() -> Constants {
    Constants::new(10.0)
        .with_action_param("build_house", "wood_cost", 30.0)
        .with_action_param("build_house", "build_time", 10.0)
        .with_action_param("build_house", "pop_increase", 4.0)
}

/// Four villagers at a cap of 4, one idle, with exactly one house of wood.
#[must_use]
pub fn house_scenario_state() -> State {
    State::from_constants(
        &Constants::new(10.0)
            .with_initial("villagers", 4.0)
            .with_initial("idle_villagers", 1.0)
            .with_initial("food_workers", 3.0)
            .with_initial("wood", 30.0)
            .with_initial("population_cap", 4.0),
    )
}

/// Weights `{villagers: 1, food: 0.01, wood: 0.01}` with idle and block penalties.
#[must_use]
pub fn fitness_scenario_constants() -> Constants {
    Constants::new(10.0)
        .with_weight("villagers", 1.0)
        .with_weight("food", 0.01)
        .with_weight("wood", 0.01)
        .with_penalty("tc_idle_per_sec", 0.1)
        .with_penalty("pop_block_per_sec", 0.5)
}

/// Final state that scores 3.6 under [`fitness_scenario_constants`].
#[must_use]
pub fn fitness_scenario_state() -> State {
    let mut state = State::from_constants(&Constants::new(10.0).with_initial("villagers", 5.0));
    state.food = 120.0;
    state.wood = 40.0;
    state.tc_idle_time = 30.0;
    state.pop_block_time = 0.0;
    state
}
