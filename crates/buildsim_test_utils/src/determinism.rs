//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A genetic search compares fitness values across thousands of runs, so a
//! chromosome must always score the same. Sources of non-determinism include:
//!
//! - **Map iteration order**: `HashMap` iteration is randomized. Constants use
//!   `BTreeMap` so lookups and serialized output are ordered.
//!
//! - **Hidden state**: every run must build a fresh [`State`] from the
//!   constants and share nothing mutable with other runs.
//!
//! - **Float formatting**: traces are compared by exact bit pattern, never
//!   through rounded display strings.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual phases are deterministic
//! 2. **Property tests**: random chromosomes and constants replay identically
//! 3. **Parallel tests**: N concurrent runs against shared constants all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use buildsim_core::actions::Action;
use buildsim_core::data::Constants;
use buildsim_core::error::Result;
use buildsim_core::simulation::{simulate, step, SimulationReport};
use buildsim_core::state::State;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Report hash from each simulation.
    pub hashes: Vec<u64>,
    /// Chromosome length each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use buildsim_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 2, |n| *n);
/// result.assert_deterministic();
/// assert_eq!(result.hashes, vec![20, 20, 20]);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Hash everything a caller can observe about a run.
///
/// Errors hash by their debug form, so a chromosome that always fails the
/// same way is still deterministic.
#[must_use]
pub fn outcome_hash(outcome: &Result<SimulationReport>) -> u64 {
    match outcome {
        Ok(report) => report_hash(report),
        Err(e) => compute_hash(&format!("{e:?}")),
    }
}

/// Hash fitness, final state and the full trace of a report.
///
/// The trace is hashed through its debug form, which prints floats exactly.
#[must_use]
pub fn report_hash(report: &SimulationReport) -> u64 {
    let mut hasher = DefaultHasher::new();
    report.fitness.to_bits().hash(&mut hasher);
    report.final_state.state_hash().hash(&mut hasher);
    format!("{:?}", report.trace).hash(&mut hasher);
    hasher.finish()
}

/// Simulate the same chromosome `runs` times and compare the reports.
///
/// # Example
///
/// ```
/// use buildsim_test_utils::determinism::verify_simulate_determinism;
/// use buildsim_test_utils::fixtures::starter_constants;
///
/// let result = verify_simulate_determinism(&[2, 3, 1, 0, 6, 0], &starter_constants(), 4);
/// result.assert_deterministic();
/// ```
#[must_use]
pub fn verify_simulate_determinism(
    chromosome: &[i32],
    constants: &Constants,
    runs: usize,
) -> DeterminismResult {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| outcome_hash(&simulate(chromosome, constants)))
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: chromosome.len() as u64,
    }
}

/// Apply `actions` to a fresh state, one per tick, advancing the clock.
#[must_use]
pub fn replay(actions: &[Action], constants: &Constants) -> State {
    let mut state = State::from_constants(constants);
    for &action in actions {
        step(&mut state, action, constants);
        state.time += constants.tick_seconds;
    }
    state
}

/// Run N simulations on scoped threads against shared constants.
///
/// The constants are borrowed by every thread at once, which is exactly how a
/// parallel population scorer uses them.
///
/// # Panics
///
/// Panics if a simulation thread panics.
#[must_use]
pub fn run_parallel_simulations_scoped(
    chromosome: &[i32],
    constants: &Constants,
    num_sims: usize,
) -> ParallelSimResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| s.spawn(|| outcome_hash(&simulate(chromosome, constants))))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("simulation thread panicked")))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: chromosome.len() as u64,
        num_sims,
    }
}

/// Compare two step-by-step replays tick-by-tick, finding first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// two runs start to differ.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(tick)` if they diverge at that
/// tick. Tick 0 is the initial state.
#[must_use]
pub fn find_first_divergence(actions: &[Action], constants: &Constants) -> Option<u64> {
    let mut first = State::from_constants(constants);
    let mut second = State::from_constants(constants);

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (tick, &action) in (1u64..).zip(actions) {
        step(&mut first, action, constants);
        step(&mut second, action, constants);

        if first.state_hash() != second.state_hash() {
            tracing::warn!(tick, action = %action, "Replays diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round trip preserves the state exactly.
///
/// The state is replayed from `actions`, snapshotted with bincode, restored,
/// and its hash compared against the original.
#[must_use]
pub fn verify_serialization_determinism(actions: &[Action], constants: &Constants) -> bool {
    let state = replay(actions, constants);
    let hash_before = state.state_hash();

    let Ok(bytes) = state.serialize() else {
        return false;
    };
    let Ok(restored) = State::deserialize(&bytes) else {
        return false;
    };

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of simulation determinism.
pub mod strategies {
    use buildsim_core::actions::Action;
    use buildsim_core::data::Constants;
    use buildsim_core::genes::GENE_TABLE;
    use proptest::prelude::*;

    /// Generate a gene inside the decode table.
    pub fn arb_gene() -> impl Strategy<Value = i32> {
        0i32..GENE_TABLE.len() as i32
    }

    /// Generate a gene outside the decode table.
    pub fn arb_invalid_gene() -> impl Strategy<Value = i32> {
        prop_oneof![i32::MIN..0i32, GENE_TABLE.len() as i32..i32::MAX]
    }

    /// Generate a valid chromosome.
    pub fn arb_chromosome(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
        proptest::collection::vec(arb_gene(), 0..max_len)
    }

    /// Generate any action from the decode table.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        proptest::sample::select(GENE_TABLE.to_vec())
    }

    /// Generate a sequence of actions.
    pub fn arb_action_sequence(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        proptest::collection::vec(arb_action(), 0..max_len)
    }

    /// Generate balance constants with a consistent starting population.
    ///
    /// Every villager starts idle so the starting state is balanced.
    pub fn arb_constants() -> impl Strategy<Value = Constants> {
        (
            1u32..=30,
            (0u32..=20, 0u32..=20),
            (0u32..=100, 1u32..=60),
            (0u32..=100, 1u32..=60, 0u32..=10),
            (0u32..=10, 0u32..=12),
            (0u32..=500, 0u32..=500),
        )
            .prop_map(
                |(tick, (food_rate, wood_rate), (food_cost, train_time), house, start, stock)| {
                    let (wood_cost, build_time, pop_increase) = house;
                    let (villagers, cap) = start;
                    let (food, wood) = stock;
                    Constants::new(f64::from(tick))
                        .with_gather_rate("food", f64::from(food_rate) / 10.0)
                        .with_gather_rate("wood", f64::from(wood_rate) / 10.0)
                        .with_action_param("train_villager", "food_cost", f64::from(food_cost))
                        .with_action_param("train_villager", "train_time", f64::from(train_time))
                        .with_action_param("build_house", "wood_cost", f64::from(wood_cost))
                        .with_action_param("build_house", "build_time", f64::from(build_time))
                        .with_action_param("build_house", "pop_increase", f64::from(pop_increase))
                        .with_initial("villagers", f64::from(villagers))
                        .with_initial("population_cap", f64::from(cap))
                        .with_initial("food", f64::from(food))
                        .with_initial("wood", f64::from(wood))
                        .with_penalty("tc_idle_per_sec", 0.1)
                        .with_penalty("pop_block_per_sec", 0.5)
                        .with_weight("villagers", 1.0)
                        .with_weight("food", 0.01)
                        .with_weight("wood", 0.01)
                },
            )
    }
}
