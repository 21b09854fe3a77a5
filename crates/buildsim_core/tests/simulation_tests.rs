//! End-to-end scenarios run through the public API.

use buildsim_core::prelude::*;
use buildsim_core::trace::first_difference;
use buildsim_test_utils::determinism::{replay, strategies, verify_simulate_determinism};
use buildsim_test_utils::fixtures::{
    fitness_scenario_constants, fitness_scenario_state, house_scenario_constants,
    house_scenario_state, starter_constants, train_scenario_constants, STARTER_CONSTANTS_RON,
};
use proptest::prelude::*;

fn ticks(report: &SimulationReport) -> Vec<&TickRecord> {
    report.trace.iter().filter_map(TraceEntry::as_tick).collect()
}

#[test]
fn training_does_not_consume_the_idle_villager() {
    let constants = train_scenario_constants();
    let mut state = State::from_constants(&constants);

    let outcome = apply_action(&mut state, Action::TrainVillager, &constants);

    assert!(outcome.success);
    assert_eq!(state.food, 0.0);
    assert_eq!(state.train_progress, Some(20.0));
    assert_eq!(state.idle_villagers, 1);
}

#[test]
fn train_assign_noop_scenario() {
    let report = simulate(&[1, 2, 0, 0, 0], &train_scenario_constants()).unwrap();
    let records = ticks(&report);

    assert_eq!(records.len(), 5);

    assert_eq!(records[0].action, "train_villager");
    assert!(records[0].success);
    assert_eq!(records[0].food, 0.0);

    // Training is still 10s out; the idle villager goes to food.
    assert_eq!(records[1].action, "assign_food");
    assert!(records[1].success);
    assert_eq!(records[1].idle, 0);
    assert_eq!(records[1].food_workers, 1);
    assert_eq!(records[1].villagers, 1);

    // Training completes at the start of tick 2.
    assert_eq!(records[2].villagers, 2);
    assert_eq!(records[2].idle, 1);
    assert_eq!(records[2].income.food, 10.0);

    assert_eq!(records[4].food, 30.0);

    let summary = report.trace[5].as_summary().unwrap();
    assert_eq!(summary.tick, 5);
    assert_eq!(summary.time, 50.0);
    assert_eq!(summary.summary.villagers, 2);
    assert_eq!(summary.summary.food, 30.0);
    // Ticks 0, 3 and 4 started with an empty training slot.
    assert_eq!(summary.summary.tc_idle_time, 30.0);
    assert_eq!(summary.summary.pop_block_time, 0.0);
}

#[test]
fn second_training_order_is_rejected_while_busy() {
    let constants = train_scenario_constants().with_initial("food", 500.0);
    let report = simulate(&[1, 1], &constants).unwrap();
    let records = ticks(&report);

    assert!(records[0].success);
    assert!(!records[1].success);
    assert_eq!(records[1].reason, "town center busy");
    assert_eq!(records[1].food, 450.0);
}

#[test]
fn house_scenario() {
    let constants = house_scenario_constants();
    let mut state = house_scenario_state();

    let outcome = apply_action(&mut state, Action::BuildHouse, &constants);

    assert!(outcome.success);
    assert_eq!(state.wood, 0.0);
    assert_eq!(state.idle_villagers, 0);
    assert_eq!(state.house_progress, Some(10.0));

    advance(&mut state, &constants);

    assert_eq!(state.house_progress, None);
    assert_eq!(state.population_cap, 8);
    assert_eq!(state.idle_villagers, 1);
    // advance does not clear events; only the next action does.
    assert_eq!(state.event_strings(), vec!["house(+4) queued", "house completed"]);
    assert!(state.workers_balanced());
}

#[test]
fn fitness_scenario() {
    let fitness = score(&fitness_scenario_state(), &fitness_scenario_constants());
    assert!((fitness - 3.6).abs() < 1e-9, "fitness was {fitness}");
}

#[test]
fn pop_block_accrues_and_penalizes() {
    // One villager at a cap of one; the slot is never used.
    let constants = Constants::new(10.0)
        .with_initial("villagers", 1.0)
        .with_initial("population_cap", 1.0)
        .with_penalty("pop_block_per_sec", 0.5)
        .with_penalty("tc_idle_per_sec", 0.1);

    let report = simulate(&[0, 0, 0], &constants).unwrap();

    assert_eq!(report.final_state.pop_block_time, 30.0);
    assert_eq!(report.final_state.tc_idle_time, 30.0);
    assert!((report.fitness + 18.0).abs() < 1e-9);
}

#[test]
fn unknown_gene_reports_value_and_tick() {
    let err = simulate(&[0, 1, 2, 7], &train_scenario_constants()).unwrap_err();

    assert_eq!(err, SimError::UnknownGene { gene: 7, tick: 3 });
    assert_eq!(err.to_string(), "Unknown action index '7' at tick 3");
}

#[test]
fn identical_inputs_give_identical_reports() {
    let constants = starter_constants();
    let chromosome = [2, 2, 3, 1, 0, 6, 0, 0, 1, 4, 5, 0, 1, 3];

    let first = simulate(&chromosome, &constants).unwrap();
    let second = simulate(&chromosome, &constants).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_difference(&first.trace, &second.trace), None);
    verify_simulate_determinism(&chromosome, &constants, 5).assert_deterministic();
}

#[test]
fn formats_load_the_same_constants() {
    let yaml = include_str!("../../../assets/data/constants.yaml");
    let ron = include_str!("../../../assets/data/constants.ron");

    let from_yaml = load_constants(yaml, ConstantsFormat::Yaml).unwrap();
    let from_ron = load_constants(ron, ConstantsFormat::Ron).unwrap();
    let fixture = load_constants(STARTER_CONSTANTS_RON, ConstantsFormat::Ron).unwrap();

    assert_eq!(from_yaml, from_ron);
    assert_eq!(from_ron, fixture);
}

#[test]
fn working_villagers_beat_idle_villagers() {
    let constants = starter_constants();
    let idle = simulate(&[0; 30], &constants).unwrap();

    let mut working = vec![2, 2, 3];
    working.resize(30, 0);
    let worked = simulate(&working, &constants).unwrap();

    assert_eq!(worked.final_state.villagers, idle.final_state.villagers);
    assert_eq!(worked.final_state.tc_idle_time, idle.final_state.tc_idle_time);
    assert!(worked.final_state.food > idle.final_state.food);
    assert!(worked.final_state.wood > idle.final_state.wood);
    assert!(worked.fitness > idle.fitness);
}

#[test]
fn trace_serializes_to_documented_shape() {
    let report = simulate(&[2, 0], &train_scenario_constants()).unwrap();
    let json = serde_json::to_value(&report.trace).unwrap();

    let first = &json[0];
    for key in [
        "tick",
        "time",
        "action",
        "success",
        "reason",
        "food",
        "wood",
        "villagers",
        "idle",
        "food_workers",
        "wood_workers",
        "population_cap",
        "income",
        "events",
    ] {
        assert!(first.get(key).is_some(), "missing {key}");
    }

    let last = &json[2];
    assert_eq!(last["tick"], 2);
    assert_eq!(last["summary"]["food"], 60.0);
}

#[test]
fn trace_rounds_exact_halves_to_even() {
    let constants = Constants::new(10.0)
        .with_initial("food", 10.125)
        .with_initial("wood", 0.125);
    let report = simulate(&[0], &constants).unwrap();

    let tick = ticks(&report)[0];
    assert_eq!(tick.food, 10.12);
    assert_eq!(tick.wood, 0.12);

    let summary = &report.trace[1].as_summary().unwrap().summary;
    assert_eq!(summary.food, 10.12);
    assert_eq!(summary.wood, 0.12);
    // Only the trace is rounded.
    assert_eq!(report.final_state.food, 10.125);
}

proptest! {
    /// A rejected action changes nothing but the event list.
    #[test]
    fn rejections_are_side_effect_free(
        prefix in strategies::arb_action_sequence(40),
        action in strategies::arb_action(),
        constants in strategies::arb_constants(),
    ) {
        let mut state = replay(&prefix, &constants);
        let before = state.clone();

        let outcome = apply_action(&mut state, action, &constants);
        if !outcome.success {
            state.events.clone_from(&before.events);
            prop_assert_eq!(state, before);
        }
    }

    /// Villagers only ever move between pools, whatever the chromosome.
    #[test]
    fn final_state_keeps_every_villager_in_one_pool(
        chromosome in strategies::arb_chromosome(60),
        constants in strategies::arb_constants(),
    ) {
        let report = simulate(&chromosome, &constants).unwrap();
        prop_assert!(report.final_state.workers_balanced(), "{:?}", report.final_state);
        prop_assert_eq!(report.trace.len(), chromosome.len() + 1);
    }
}
