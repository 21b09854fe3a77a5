//! Mutable simulation snapshot.
//!
//! One [`State`] is built per run from the configured starting values and is
//! then advanced in place, tick by tick, by the economy, production and action
//! phases. Nothing keeps a reference to it between ticks except the driver.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::data::Constants;
use crate::error::{Result, SimError};

/// Minimum population cap when none is configured.
pub const DEFAULT_MIN_POPULATION_CAP: i32 = 4;

/// Notice generated during a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickEvent {
    /// A villager finished training and joined the idle pool.
    VillagerTrained,
    /// A house finished and raised the population cap.
    HouseCompleted,
    /// A house was queued; it will add this much population cap.
    HouseQueued {
        /// Population cap the house adds on completion.
        pop_increase: i32,
    },
}

impl fmt::Display for TickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VillagerTrained => write!(f, "villager trained"),
            Self::HouseCompleted => write!(f, "house completed"),
            Self::HouseQueued { pop_increase } => write!(f, "house(+{pop_increase}) queued"),
        }
    }
}

/// Economy state advanced by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Elapsed in-game seconds.
    pub time: f64,
    /// Total villagers.
    pub villagers: i32,
    /// Villagers not assigned to a resource.
    pub idle_villagers: i32,
    /// Villagers gathering food.
    pub food_workers: i32,
    /// Villagers gathering wood.
    pub wood_workers: i32,
    /// Population cap. Soft: only gates new training and accrues a penalty.
    pub population_cap: i32,
    /// Food stockpile.
    pub food: f64,
    /// Wood stockpile.
    pub wood: f64,
    /// Seconds until the queued villager completes; `None` when the slot is free.
    pub train_progress: Option<f64>,
    /// Seconds until the queued house completes; `None` when no house is building.
    pub house_progress: Option<f64>,
    /// Cumulative seconds the training slot sat empty.
    pub tc_idle_time: f64,
    /// Cumulative seconds spent at or above the population cap.
    pub pop_block_time: f64,
    /// Notices generated during the current tick.
    pub events: Vec<TickEvent>,
}

impl State {
    /// Build the starting state from the configured initial values.
    ///
    /// Unset fields default to: no villagers, all villagers idle, a population
    /// cap of at least [`DEFAULT_MIN_POPULATION_CAP`], and empty stockpiles.
    #[must_use]
    pub fn from_constants(constants: &Constants) -> Self {
        let int = |field: &str| constants.initial(field).map(|v| v as i32);

        let villagers = int("villagers").unwrap_or(0);
        let idle_villagers = int("idle_villagers").unwrap_or(villagers);
        let population_cap =
            int("population_cap").unwrap_or_else(|| villagers.max(DEFAULT_MIN_POPULATION_CAP));

        Self {
            time: 0.0,
            villagers,
            idle_villagers,
            food_workers: int("food_workers").unwrap_or(0),
            wood_workers: int("wood_workers").unwrap_or(0),
            population_cap,
            food: constants.initial("food").unwrap_or(0.0),
            wood: constants.initial("wood").unwrap_or(0.0),
            train_progress: None,
            house_progress: None,
            tc_idle_time: 0.0,
            pop_block_time: 0.0,
            events: Vec::new(),
        }
    }

    /// Whether every villager is accounted for in exactly one pool.
    #[must_use]
    pub fn workers_balanced(&self) -> bool {
        self.villagers == self.idle_villagers + self.food_workers + self.wood_workers
    }

    /// Whether the villager count has reached the population cap.
    #[must_use]
    pub fn is_pop_blocked(&self) -> bool {
        self.villagers >= self.population_cap
    }

    /// Event notices rendered as trace strings.
    #[must_use]
    pub fn event_strings(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    /// Compute a hash of the simulation state.
    ///
    /// Two runs that reached the same state produce the same hash. Floats are
    /// hashed by bit pattern.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.time.to_bits().hash(&mut hasher);
        self.villagers.hash(&mut hasher);
        self.idle_villagers.hash(&mut hasher);
        self.food_workers.hash(&mut hasher);
        self.wood_workers.hash(&mut hasher);
        self.population_cap.hash(&mut hasher);
        self.food.to_bits().hash(&mut hasher);
        self.wood.to_bits().hash(&mut hasher);
        self.train_progress.map(f64::to_bits).hash(&mut hasher);
        self.house_progress.map(f64::to_bits).hash(&mut hasher);
        self.tc_idle_time.to_bits().hash(&mut hasher);
        self.pop_block_time.to_bits().hash(&mut hasher);
        self.events.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the state to a binary snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SimError::InvalidState(format!("Failed to serialize state: {e}")))
    }

    /// Deserialize a state from a binary snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| SimError::InvalidState(format!("Failed to deserialize state: {e}")))
    }
}
