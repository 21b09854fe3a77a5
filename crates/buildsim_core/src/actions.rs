//! Player action resolution.
//!
//! Each tick the driver attempts exactly one [`Action`]. An action either
//! succeeds and mutates the state, or is rejected with a [`Rejection`] and
//! leaves every field except `events` untouched. Rejections are ordinary
//! outcomes that the fitness function and trace consumer expect, not errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Constants;
use crate::state::{State, TickEvent};

/// A gatherable resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Food pool.
    Food,
    /// Wood pool.
    Wood,
}

impl ResourceKind {
    /// Configuration and trace name of this resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Wood => "wood",
        }
    }

    /// Pool targeted by an `idle_one` target string.
    ///
    /// Only `"wood"` selects the wood pool; a missing or any other target
    /// selects food.
    #[must_use]
    pub fn from_target(target: Option<&str>) -> Self {
        match target {
            Some("wood") => Self::Wood,
            _ => Self::Food,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A discrete player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Do nothing this tick.
    Noop,
    /// Queue a villager at the town center.
    TrainVillager,
    /// Send one idle villager to food.
    AssignFood,
    /// Send one idle villager to wood.
    AssignWood,
    /// Pull one worker back to idle, preferring the targeted pool.
    IdleOne(ResourceKind),
    /// Queue a house, consuming one idle villager as the builder.
    BuildHouse,
}

impl Action {
    /// Name of the action as it appears in constants and traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::TrainVillager => "train_villager",
            Self::AssignFood => "assign_food",
            Self::AssignWood => "assign_wood",
            Self::IdleOne(_) => "idle_one",
            Self::BuildHouse => "build_house",
        }
    }

    /// Resolve an action by name, with an optional target for `idle_one`.
    ///
    /// Returns `None` for an unrecognized name.
    #[must_use]
    pub fn from_name(name: &str, target: Option<&str>) -> Option<Self> {
        let action = match name {
            "noop" => Self::Noop,
            "train_villager" => Self::TrainVillager,
            "assign_food" => Self::AssignFood,
            "assign_wood" => Self::AssignWood,
            "idle_one" => Self::IdleOne(ResourceKind::from_target(target)),
            "build_house" => Self::BuildHouse,
            _ => return None,
        };
        Some(action)
    }

    /// Target pool, for actions that take one.
    #[must_use]
    pub const fn target(self) -> Option<ResourceKind> {
        match self {
            Self::IdleOne(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(kind) => write!(f, "{}/{kind}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Why an action could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A villager is already training.
    #[error("town center busy")]
    TownCenterBusy,
    /// Not enough food to pay for a villager.
    #[error("not enough food")]
    NotEnoughFood,
    /// Villager count has reached the population cap.
    #[error("population capped")]
    PopulationCapped,
    /// No idle villager to assign or build with.
    #[error("no idle villager")]
    NoIdleVillager,
    /// Neither the targeted nor the fallback pool has a worker.
    #[error("no worker on target resource")]
    NoWorkerOnTarget,
    /// A house is already under construction.
    #[error("another house in progress")]
    HouseInProgress,
    /// Not enough wood to pay for a house.
    #[error("not enough wood")]
    NotEnoughWood,
    /// The action name is not recognized.
    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// Result of attempting one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the action was carried out.
    pub success: bool,
    /// Diagnostic message: what happened, or why nothing did.
    pub reason: String,
}

impl ActionOutcome {
    fn applied(reason: &str) -> Self {
        Self {
            success: true,
            reason: reason.to_string(),
        }
    }
}

impl From<Rejection> for ActionOutcome {
    fn from(rejection: Rejection) -> Self {
        Self {
            success: false,
            reason: rejection.to_string(),
        }
    }
}

impl From<Result<&'static str, Rejection>> for ActionOutcome {
    fn from(result: Result<&'static str, Rejection>) -> Self {
        match result {
            Ok(reason) => Self::applied(reason),
            Err(rejection) => rejection.into(),
        }
    }
}

/// Apply an action given by name.
///
/// Clears `state.events`, then resolves the name and applies the action.
/// An unrecognized name is rejected with `unknown action '<name>'`.
pub fn apply(
    state: &mut State,
    action_name: &str,
    target: Option<&str>,
    constants: &Constants,
) -> ActionOutcome {
    match Action::from_name(action_name, target) {
        Some(action) => apply_action(state, action, constants),
        None => {
            state.events.clear();
            Rejection::UnknownAction(action_name.to_string()).into()
        }
    }
}

/// Apply a typed action.
///
/// Clears `state.events` first. On rejection no other field is modified.
pub fn apply_action(state: &mut State, action: Action, constants: &Constants) -> ActionOutcome {
    state.events.clear();
    let result = match action {
        Action::Noop => Ok(""),
        Action::TrainVillager => train_villager(state, constants),
        Action::AssignFood => assign(state, ResourceKind::Food),
        Action::AssignWood => assign(state, ResourceKind::Wood),
        Action::IdleOne(target) => idle_one(state, target),
        Action::BuildHouse => build_house(state, constants),
    };
    result.into()
}

fn train_villager(state: &mut State, constants: &Constants) -> Result<&'static str, Rejection> {
    let params = constants.train_villager();
    if state.train_progress.is_some() {
        return Err(Rejection::TownCenterBusy);
    }
    if state.food < params.food_cost {
        return Err(Rejection::NotEnoughFood);
    }
    if state.villagers >= state.population_cap {
        return Err(Rejection::PopulationCapped);
    }
    state.food -= params.food_cost;
    state.train_progress = Some(params.train_time);
    Ok("queued villager")
}

fn assign(state: &mut State, resource: ResourceKind) -> Result<&'static str, Rejection> {
    if state.idle_villagers <= 0 {
        return Err(Rejection::NoIdleVillager);
    }
    state.idle_villagers -= 1;
    match resource {
        ResourceKind::Food => {
            state.food_workers += 1;
            Ok("assigned to food")
        }
        ResourceKind::Wood => {
            state.wood_workers += 1;
            Ok("assigned to wood")
        }
    }
}

fn idle_one(state: &mut State, target: ResourceKind) -> Result<&'static str, Rejection> {
    if target == ResourceKind::Wood && state.wood_workers > 0 {
        state.wood_workers -= 1;
        state.idle_villagers += 1;
        return Ok("wood worker idled");
    }
    if state.food_workers > 0 {
        state.food_workers -= 1;
        state.idle_villagers += 1;
        return Ok("food worker idled");
    }
    Err(Rejection::NoWorkerOnTarget)
}

fn build_house(state: &mut State, constants: &Constants) -> Result<&'static str, Rejection> {
    let params = constants.build_house();
    if state.house_progress.is_some() {
        return Err(Rejection::HouseInProgress);
    }
    if state.idle_villagers <= 0 {
        return Err(Rejection::NoIdleVillager);
    }
    if state.wood < params.wood_cost {
        return Err(Rejection::NotEnoughWood);
    }
    state.wood -= params.wood_cost;
    state.idle_villagers -= 1;
    state.house_progress = Some(params.build_time);
    state.events.push(TickEvent::HouseQueued {
        pop_increase: params.pop_increase,
    });
    Ok("house queued")
}
