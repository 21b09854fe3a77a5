//! Passive resource income.
//!
//! Workers assigned to a pool gather continuously at the configured rate.
//! Income is accrued once per tick before production and actions run.

use serde::{Deserialize, Serialize};

use crate::actions::ResourceKind;
use crate::data::Constants;
use crate::state::State;

/// Resources gathered during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Income {
    /// Food gathered.
    pub food: f64,
    /// Wood gathered.
    pub wood: f64,
}

impl Income {
    /// Round both amounts to two decimals for reporting.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            food: crate::trace::round2(self.food),
            wood: crate::trace::round2(self.wood),
        }
    }
}

/// Accrue one tick of income from assigned workers.
///
/// Only `food` and `wood` are written. Missing gather rates count as zero.
/// Returns the amounts added.
pub fn gather(state: &mut State, constants: &Constants) -> Income {
    let dt = constants.tick_seconds;
    let income = Income {
        food: f64::from(state.food_workers) * constants.gather_rate(ResourceKind::Food.name()) * dt,
        wood: f64::from(state.wood_workers) * constants.gather_rate(ResourceKind::Wood.name()) * dt,
    };
    state.food += income.food;
    state.wood += income.wood;
    income
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> Constants {
        Constants::new(10.0)
            .with_gather_rate("food", 0.8)
            .with_gather_rate("wood", 0.5)
    }

    #[test]
    fn test_gather_from_workers() {
        let c = constants();
        let mut s = State::from_constants(&Constants::new(10.0).with_initial("villagers", 3.0));
        s.idle_villagers = 0;
        s.food_workers = 2;
        s.wood_workers = 1;

        let income = gather(&mut s, &c);

        assert!((income.food - 16.0).abs() < 1e-9);
        assert!((income.wood - 5.0).abs() < 1e-9);
        assert!((s.food - 16.0).abs() < 1e-9);
        assert!((s.wood - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_gather_without_workers_is_idempotent() {
        let c = constants();
        let mut s = State::from_constants(
            &Constants::new(10.0)
                .with_initial("villagers", 2.0)
                .with_initial("food", 100.0)
                .with_initial("wood", 40.0),
        );
        let before = s.clone();

        assert_eq!(gather(&mut s, &c), Income::default());
        assert_eq!(gather(&mut s, &c), Income::default());
        assert_eq!(s, before);
    }

    #[test]
    fn test_missing_rate_yields_nothing() {
        let c = Constants::new(10.0).with_gather_rate("food", 1.0);
        let mut s = State::from_constants(&Constants::new(10.0).with_initial("villagers", 1.0));
        s.idle_villagers = 0;
        s.wood_workers = 1;

        let income = gather(&mut s, &c);

        assert_eq!(income.wood, 0.0);
        assert_eq!(s.wood, 0.0);
    }

    #[test]
    fn test_rounded_income() {
        let income = Income {
            food: 1.234_5,
            wood: 2.0 / 3.0,
        };
        assert_eq!(income.rounded(), Income { food: 1.23, wood: 0.67 });
    }
}
