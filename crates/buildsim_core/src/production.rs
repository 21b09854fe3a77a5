//! Training and construction timers.
//!
//! The town center trains at most one villager at a time and at most one
//! house is under construction. Each tick both timers count down by the tick
//! length; a timer that reaches zero completes in that same tick and any
//! overshoot is discarded rather than carried into the next order.

use crate::data::Constants;
use crate::state::{State, TickEvent};

/// Advance in-flight training and construction by one tick.
///
/// Called once per tick, before the tick's action is applied. Also accrues
/// town-center idle time and population-block time.
pub fn advance(state: &mut State, constants: &Constants) {
    let dt = constants.tick_seconds;

    match state.train_progress {
        Some(remaining) => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                state.train_progress = None;
                state.villagers += 1;
                state.idle_villagers += 1;
                state.events.push(TickEvent::VillagerTrained);
            } else {
                state.train_progress = Some(remaining);
            }
        }
        None => state.tc_idle_time += dt,
    }

    if let Some(remaining) = state.house_progress {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            state.house_progress = None;
            state.population_cap += constants.build_house().pop_increase;
            // The builder returns to the idle pool.
            state.idle_villagers += 1;
            state.events.push(TickEvent::HouseCompleted);
        } else {
            state.house_progress = Some(remaining);
        }
    }

    if state.is_pop_blocked() {
        state.pop_block_time += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants(tick_seconds: f64) -> Constants {
        Constants::new(tick_seconds).with_action_param("build_house", "pop_increase", 4.0)
    }

    fn state(villagers: i32, population_cap: i32) -> State {
        let c = Constants::new(10.0)
            .with_initial("villagers", f64::from(villagers))
            .with_initial("population_cap", f64::from(population_cap));
        State::from_constants(&c)
    }

    #[test]
    fn test_empty_slot_accrues_idle_time() {
        let c = constants(10.0);
        let mut s = state(1, 4);

        advance(&mut s, &c);
        advance(&mut s, &c);

        assert_eq!(s.tc_idle_time, 20.0);
        assert_eq!(s.pop_block_time, 0.0);
    }

    #[test]
    fn test_training_counts_down() {
        let c = constants(10.0);
        let mut s = state(1, 4);
        s.train_progress = Some(20.0);

        advance(&mut s, &c);

        assert_eq!(s.train_progress, Some(10.0));
        assert_eq!(s.villagers, 1);
        assert_eq!(s.tc_idle_time, 0.0);
        assert!(s.events.is_empty());
    }

    #[test]
    fn test_timer_equal_to_tick_completes_same_tick() {
        let c = constants(10.0);
        let mut s = state(1, 4);
        s.train_progress = Some(10.0);

        advance(&mut s, &c);

        assert_eq!(s.train_progress, None);
        assert_eq!(s.villagers, 2);
        assert_eq!(s.idle_villagers, 2);
        assert_eq!(s.events, vec![TickEvent::VillagerTrained]);
        assert!(s.workers_balanced());
        // The tick that completes training is not idle time.
        assert_eq!(s.tc_idle_time, 0.0);
    }

    #[test]
    fn test_overshoot_is_discarded() {
        let c = constants(10.0);
        let mut s = state(1, 4);
        s.train_progress = Some(3.0);

        advance(&mut s, &c);
        assert_eq!(s.train_progress, None);

        advance(&mut s, &c);
        assert_eq!(s.tc_idle_time, 10.0);
    }

    #[test]
    fn test_house_completion_raises_cap_and_returns_builder() {
        let c = constants(10.0);
        let mut s = state(4, 4);
        s.idle_villagers = 3;
        s.house_progress = Some(10.0);

        advance(&mut s, &c);

        assert_eq!(s.house_progress, None);
        assert_eq!(s.population_cap, 8);
        assert_eq!(s.idle_villagers, 4);
        assert_eq!(s.events, vec![TickEvent::HouseCompleted]);
        // Cap was raised before the block check.
        assert_eq!(s.pop_block_time, 0.0);
    }

    #[test]
    fn test_pop_block_accrues_at_cap() {
        let c = constants(5.0);
        let mut s = state(4, 4);

        advance(&mut s, &c);

        assert_eq!(s.pop_block_time, 5.0);
    }

    #[test]
    fn test_training_completion_can_exceed_cap() {
        let c = constants(10.0);
        let mut s = state(4, 4);
        s.train_progress = Some(10.0);

        advance(&mut s, &c);

        assert_eq!(s.villagers, 5);
        assert_eq!(s.pop_block_time, 10.0);
    }
}
