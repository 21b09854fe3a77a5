//! Per-tick trace records.
//!
//! The trace exists to debug build orders and to sanity-check constant
//! choices. It never feeds back into the simulation.

use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionOutcome};
use crate::economy::Income;
use crate::state::State;

/// Round to two decimals.
///
/// Rounds the exact binary value, so exact halves go to the even digit
/// (`0.125` becomes `0.12`) and values stored just below a half round down.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Snapshot recorded after a tick's action was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Tick index, starting at zero.
    pub tick: usize,
    /// In-game time at the start of the tick.
    pub time: f64,
    /// Name of the attempted action.
    pub action: String,
    /// Whether the action was carried out.
    pub success: bool,
    /// Diagnostic message for the action.
    pub reason: String,
    /// Food stockpile, two decimals.
    pub food: f64,
    /// Wood stockpile, two decimals.
    pub wood: f64,
    /// Total villagers.
    pub villagers: i32,
    /// Idle villagers.
    pub idle: i32,
    /// Food workers.
    pub food_workers: i32,
    /// Wood workers.
    pub wood_workers: i32,
    /// Population cap.
    pub population_cap: i32,
    /// Income gathered this tick, two decimals.
    pub income: Income,
    /// Events generated this tick.
    pub events: Vec<String>,
}

impl TickRecord {
    /// Build a record from the state at the end of a tick.
    #[must_use]
    pub fn capture(
        tick: usize,
        action: Action,
        outcome: &ActionOutcome,
        income: Income,
        state: &State,
    ) -> Self {
        Self {
            tick,
            time: state.time,
            action: action.name().to_string(),
            success: outcome.success,
            reason: outcome.reason.clone(),
            food: round2(state.food),
            wood: round2(state.wood),
            villagers: state.villagers,
            idle: state.idle_villagers,
            food_workers: state.food_workers,
            wood_workers: state.wood_workers,
            population_cap: state.population_cap,
            income: income.rounded(),
            events: state.event_strings(),
        }
    }
}

/// Final-state summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Total villagers.
    pub villagers: i32,
    /// Food stockpile, two decimals.
    pub food: f64,
    /// Wood stockpile, two decimals.
    pub wood: f64,
    /// Population cap.
    pub population_cap: i32,
    /// Cumulative town-center idle seconds.
    pub tc_idle_time: f64,
    /// Cumulative population-blocked seconds.
    pub pop_block_time: f64,
}

/// Terminal trace record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Number of ticks simulated.
    pub tick: usize,
    /// In-game time after the last tick.
    pub time: f64,
    /// Final-state summary.
    pub summary: Summary,
}

impl SummaryRecord {
    /// Build the summary from the final state.
    #[must_use]
    pub fn capture(ticks: usize, state: &State) -> Self {
        Self {
            tick: ticks,
            time: state.time,
            summary: Summary {
                villagers: state.villagers,
                food: round2(state.food),
                wood: round2(state.wood),
                population_cap: state.population_cap,
                tc_idle_time: state.tc_idle_time,
                pop_block_time: state.pop_block_time,
            },
        }
    }
}

/// One entry of the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceEntry {
    /// Record of a simulated tick.
    Tick(TickRecord),
    /// Terminal summary.
    Summary(SummaryRecord),
}

impl TraceEntry {
    /// The tick record, if this is one.
    #[must_use]
    pub fn as_tick(&self) -> Option<&TickRecord> {
        match self {
            Self::Tick(record) => Some(record),
            Self::Summary(_) => None,
        }
    }

    /// The summary record, if this is one.
    #[must_use]
    pub fn as_summary(&self) -> Option<&SummaryRecord> {
        match self {
            Self::Summary(record) => Some(record),
            Self::Tick(_) => None,
        }
    }
}

/// Index of the first entry that differs between two traces.
///
/// A length mismatch counts as a difference at the shorter length.
#[must_use]
pub fn first_difference(a: &[TraceEntry], b: &[TraceEntry]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Constants;
    use crate::simulation::simulate;
    use crate::state::TickEvent;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-2.5), -2.5);
        assert_eq!(round2(7.0), 7.0);
        assert_eq!(round2(12.346), 12.35);
    }

    #[test]
    fn test_round2_exact_halves_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(10.125), 10.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn test_round2_uses_stored_value() {
        // 1.005 is stored as 1.00499999999999989...
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn test_first_difference() {
        let constants = Constants::new(10.0)
            .with_gather_rate("food", 1.0)
            .with_action_param("train_villager", "food_cost", 50.0)
            .with_action_param("train_villager", "train_time", 20.0)
            .with_initial("villagers", 1.0)
            .with_initial("food", 50.0);
        let a = simulate(&[1, 2, 0], &constants).unwrap();
        let b = simulate(&[1, 3, 0], &constants).unwrap();
        let shorter = simulate(&[1, 2], &constants).unwrap();

        assert_eq!(first_difference(&a.trace, &a.trace), None);
        assert_eq!(first_difference(&a.trace, &b.trace), Some(1));
        // The summary of the shorter run sits where tick 2 would be.
        assert_eq!(first_difference(&a.trace, &shorter.trace), Some(2));
    }

    #[test]
    fn test_tick_record_json_shape() {
        let mut state = State::from_constants(&Constants::new(10.0).with_initial("villagers", 1.0));
        state.food = 12.346;
        state.events.push(TickEvent::VillagerTrained);
        let outcome = ActionOutcome {
            success: false,
            reason: "town center busy".to_string(),
        };
        let income = Income {
            food: 8.0,
            wood: 0.0,
        };

        let entry = TraceEntry::Tick(TickRecord::capture(3, Action::TrainVillager, &outcome, income, &state));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["tick"], 3);
        assert_eq!(json["action"], "train_villager");
        assert_eq!(json["success"], false);
        assert_eq!(json["food"], 12.35);
        assert_eq!(json["idle"], 1);
        assert_eq!(json["income"]["food"], 8.0);
        assert_eq!(json["events"][0], "villager trained");
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_summary_record_json_shape() {
        let state = State::from_constants(&Constants::new(10.0).with_initial("wood", 3.333));
        let entry = TraceEntry::Summary(SummaryRecord::capture(5, &state));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["tick"], 5);
        assert_eq!(json["summary"]["wood"], 3.33);
        assert!(json.get("action").is_none());

        let back: TraceEntry = serde_json::from_value(json).unwrap();
        assert!(back.as_summary().is_some());
    }
}
