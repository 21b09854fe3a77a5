//! Balance constants for data-driven simulation runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single parameter of an action table.
///
/// Numbers are coerced to `f64` at load time. Anything else is kept as-is so
/// that annotated configuration files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionParam {
    /// Numeric parameter (costs, times, population bonuses).
    Number(f64),
    /// Boolean parameter.
    Flag(bool),
    /// Free-form text parameter.
    Text(String),
}

impl ActionParam {
    /// Numeric value of this parameter, if it is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Flag(_) | Self::Text(_) => None,
        }
    }
}

impl From<f64> for ActionParam {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Immutable balance data for one simulation run.
///
/// Loaded once with [`crate::data::load_constants`] and shared read-only by
/// every tick. All maps are ordered so iteration is reproducible.
///
/// # Example RON
///
/// ```ron
/// (
///     tick_seconds: 10.0,
///     gather_rates: {"food": 0.8, "wood": 0.6},
///     actions: {
///         "train_villager": {"food_cost": 50, "train_time": 25},
///         "build_house": {"wood_cost": 30, "build_time": 30, "pop_increase": 5},
///     },
///     initial_state: {"villagers": 3, "food": 200.0, "wood": 150.0, "population_cap": 5},
///     penalties: {"tc_idle_per_sec": 0.1, "pop_block_per_sec": 0.5},
///     fitness_weights: {"villagers": 1.0, "food": 0.01, "wood": 0.01},
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Constants {
    /// In-game seconds represented by one tick.
    pub tick_seconds: f64,
    /// Resource name to gather rate per worker per second.
    pub gather_rates: BTreeMap<String, f64>,
    /// Action name to its parameter table.
    pub actions: BTreeMap<String, BTreeMap<String, ActionParam>>,
    /// State field name to its starting value.
    pub initial_state: BTreeMap<String, f64>,
    /// Penalty name to its per-second weight.
    pub penalties: BTreeMap<String, f64>,
    /// Metric name to its fitness weight.
    pub fitness_weights: BTreeMap<String, f64>,
}

/// Costs and timing of `train_villager`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainVillagerParams {
    /// Food spent when the order is queued.
    pub food_cost: f64,
    /// Seconds until the villager appears.
    pub train_time: f64,
}

/// Costs and timing of `build_house`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildHouseParams {
    /// Wood spent when the house is queued.
    pub wood_cost: f64,
    /// Seconds until the house completes.
    pub build_time: f64,
    /// Population cap added on completion.
    pub pop_increase: i32,
}

impl Constants {
    /// Create constants with the given tick length and empty tables.
    #[must_use]
    pub fn new(tick_seconds: f64) -> Self {
        Self {
            tick_seconds,
            ..Default::default()
        }
    }

    /// Set a gather rate.
    #[must_use]
    pub fn with_gather_rate(mut self, resource: &str, rate: f64) -> Self {
        self.gather_rates.insert(resource.to_string(), rate);
        self
    }

    /// Set a numeric action parameter.
    #[must_use]
    pub fn with_action_param(mut self, action: &str, param: &str, value: f64) -> Self {
        self.actions
            .entry(action.to_string())
            .or_default()
            .insert(param.to_string(), ActionParam::Number(value));
        self
    }

    /// Set a starting value for a state field.
    #[must_use]
    pub fn with_initial(mut self, field: &str, value: f64) -> Self {
        self.initial_state.insert(field.to_string(), value);
        self
    }

    /// Set a penalty weight.
    #[must_use]
    pub fn with_penalty(mut self, penalty: &str, per_second: f64) -> Self {
        self.penalties.insert(penalty.to_string(), per_second);
        self
    }

    /// Set a fitness weight.
    #[must_use]
    pub fn with_weight(mut self, metric: &str, weight: f64) -> Self {
        self.fitness_weights.insert(metric.to_string(), weight);
        self
    }

    /// Gather rate for a resource, 0 when not configured.
    #[must_use]
    pub fn gather_rate(&self, resource: &str) -> f64 {
        self.gather_rates.get(resource).copied().unwrap_or(0.0)
    }

    /// Numeric action parameter, 0 when absent or not a number.
    #[must_use]
    pub fn action_number(&self, action: &str, param: &str) -> f64 {
        self.actions
            .get(action)
            .and_then(|params| params.get(param))
            .and_then(ActionParam::as_number)
            .unwrap_or(0.0)
    }

    /// Starting value of a state field, if configured.
    #[must_use]
    pub fn initial(&self, field: &str) -> Option<f64> {
        self.initial_state.get(field).copied()
    }

    /// Penalty weight, 0 when not configured.
    #[must_use]
    pub fn penalty(&self, name: &str) -> f64 {
        self.penalties.get(name).copied().unwrap_or(0.0)
    }

    /// Fitness weight, 0 when not configured.
    #[must_use]
    pub fn weight(&self, metric: &str) -> f64 {
        self.fitness_weights.get(metric).copied().unwrap_or(0.0)
    }

    /// Parameters of the `train_villager` action.
    #[must_use]
    pub fn train_villager(&self) -> TrainVillagerParams {
        TrainVillagerParams {
            food_cost: self.action_number("train_villager", "food_cost"),
            train_time: self.action_number("train_villager", "train_time"),
        }
    }

    /// Parameters of the `build_house` action.
    #[must_use]
    pub fn build_house(&self) -> BuildHouseParams {
        BuildHouseParams {
            wood_cost: self.action_number("build_house", "wood_cost"),
            build_time: self.action_number("build_house", "build_time"),
            pop_increase: self.action_number("build_house", "pop_increase") as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_default_to_zero() {
        let constants = Constants::new(10.0);

        assert_eq!(constants.gather_rate("food"), 0.0);
        assert_eq!(constants.penalty("tc_idle_per_sec"), 0.0);
        assert_eq!(constants.weight("villagers"), 0.0);
        assert_eq!(constants.initial("villagers"), None);
        assert_eq!(constants.train_villager().food_cost, 0.0);
    }

    #[test]
    fn test_builder_populates_tables() {
        let constants = Constants::new(5.0)
            .with_gather_rate("wood", 0.6)
            .with_action_param("build_house", "wood_cost", 30.0)
            .with_action_param("build_house", "pop_increase", 5.0)
            .with_initial("villagers", 3.0)
            .with_penalty("pop_block_per_sec", 0.5)
            .with_weight("food", 0.01);

        assert_eq!(constants.gather_rate("wood"), 0.6);
        assert_eq!(constants.build_house().wood_cost, 30.0);
        assert_eq!(constants.build_house().pop_increase, 5);
        assert_eq!(constants.initial("villagers"), Some(3.0));
        assert_eq!(constants.penalty("pop_block_per_sec"), 0.5);
        assert_eq!(constants.weight("food"), 0.01);
    }

    #[test]
    fn test_non_numeric_param_reads_as_zero() {
        let mut constants = Constants::new(10.0);
        constants
            .actions
            .entry("train_villager".to_string())
            .or_default()
            .insert("food_cost".to_string(), ActionParam::Text("cheap".to_string()));

        assert_eq!(constants.action_number("train_villager", "food_cost"), 0.0);
    }

    #[test]
    fn test_pop_increase_truncates() {
        let constants = Constants::new(10.0).with_action_param("build_house", "pop_increase", 4.9);
        assert_eq!(constants.build_house().pop_increase, 4);
    }
}
