//! End-to-end scenarios for the population system: mortality, marriage,
//! retirement, determinism, and resuming from saved state.

use civitas_core::bus::{EventLog, NullSink};
use civitas_core::config::SimulationConfig;
use civitas_core::orchestrator::PopulationSystem;
use civitas_core::persistence::PersistedState;
use civitas_core::runner::{RunEndReason, calendar_for, run_days, run_years};
use civitas_core::seeding::base_population;
use civitas_population::{HazardBand, RomanNamingRules, ValidationIssue, ValidationMode};
use civitas_types::{
    Character, CharacterId, Gender, PopulationEvent, RomanName, SimDate, SocialClass,
};

fn citizen(id: u64, gender: Gender, age: u32, family: &str) -> Character {
    let name = match gender {
        Gender::Male => RomanName::new(Some("Gaius"), family, None, gender),
        Gender::Female => RomanName::new(None, &RomanNamingRules::feminize(family), None, gender),
    };
    let year = (-248_i32).checked_sub(i32::try_from(age).unwrap()).unwrap();
    let birth = SimDate::new(year, 6, 15).unwrap();
    Character::new(
        CharacterId::new(id),
        name,
        family,
        SocialClass::Plebeian,
        birth,
        age,
    )
}

fn no_births(mut config: SimulationConfig) -> SimulationConfig {
    config.births.enabled = false;
    config
}

fn mortality_run(seed: u64) -> (usize, Vec<PopulationEvent>) {
    let mut config = no_births(SimulationConfig::default());
    config.world.seed = seed;
    config.mortality.bands = vec![HazardBand {
        min_age: 80,
        max_age: 89,
        yearly_probability: 0.20,
    }];
    let mut system = PopulationSystem::new(&config).unwrap();
    let elders = (1..=1000)
        .map(|id| citizen(id, Gender::Male, 80, "Sulpicius"))
        .collect();
    system.seed_population(elders);

    let mut calendar = calendar_for(&system);
    let mut log = EventLog::new();
    let summary = run_days(&mut calendar, &mut system, 365, &mut log).unwrap();
    assert_eq!(summary.end_reason, RunEndReason::Completed);
    assert_eq!(summary.living + summary.deaths, 1000);
    (summary.deaths, log.drain())
}

#[test]
fn a_fifth_of_the_elderly_die_within_a_year() {
    let (deaths, events) = mortality_run(2024);
    assert!(
        (140..=260).contains(&deaths),
        "expected about 200 deaths, got {deaths}"
    );
    let died = events
        .iter()
        .filter(|event| matches!(event, PopulationEvent::CharacterDied(_)))
        .count();
    assert_eq!(died, deaths);
}

#[test]
fn mortality_is_identical_under_the_same_seed() {
    let (first_deaths, first_events) = mortality_run(77);
    let (second_deaths, second_events) = mortality_run(77);
    assert_eq!(first_deaths, second_deaths);
    assert_eq!(first_events, second_events);
}

#[test]
fn matchmaking_cap_limits_marriages_per_day() {
    let mut config = no_births(SimulationConfig::default());
    config.mortality.bands.clear();
    config.marriage.daily_matchmaking_cap = 1;
    config.marriage.match_probability = 1.0;
    let mut system = PopulationSystem::new(&config).unwrap();
    system.seed_population(vec![
        citizen(1, Gender::Male, 25, "Licinius"),
        citizen(2, Gender::Female, 20, "Marcius"),
        citizen(3, Gender::Male, 30, "Livius"),
        citizen(4, Gender::Female, 22, "Papirius"),
    ]);

    let mut calendar = calendar_for(&system);
    let mut log = EventLog::new();
    run_days(&mut calendar, &mut system, 10, &mut log).unwrap();

    for event in log.events() {
        if let PopulationEvent::PopulationTick(tick) = event {
            assert!(tick.marriages.len() <= 1, "{} marriages on {}", tick.marriages.len(), tick.date);
        }
    }
    assert_eq!(log.count("character_married"), 2);
    for id in 1..=4 {
        let character = system.repository().get(CharacterId::new(id)).unwrap();
        let spouse = character.spouse_id.unwrap();
        let partner = system.repository().get(spouse).unwrap();
        assert_eq!(partner.spouse_id, Some(character.id));
        assert_ne!(partner.gender, character.gender);
    }
}

#[test]
fn sixty_five_year_olds_retire_once() {
    let config = no_births(SimulationConfig::default());
    let mut system = PopulationSystem::new(&config).unwrap();
    let mut senator = citizen(1, Gender::Male, 65, "Fabius");
    senator.ambition.goal = "Seek the consulship".to_owned();
    senator.ambition.intensity = 70;
    senator.ambition.target_year = Some(-245);
    system.seed_population(vec![senator]);

    let mut log = EventLog::new();
    system.run_annual(-248, &mut log).unwrap();
    let retired = system.repository().get(CharacterId::new(1)).unwrap();
    assert!(retired.ambition.is_retired);
    assert_eq!(retired.ambition.intensity, 0);
    assert_eq!(retired.ambition.target_year, None);
    assert_eq!(log.count("retired"), 1);
    assert_eq!(log.count("ambition_changed"), 1);

    let mut next_year = EventLog::new();
    system.run_annual(-247, &mut next_year).unwrap();
    assert_eq!(next_year.count("retired"), 0);
    assert_eq!(next_year.count("ambition_changed"), 0);
}

fn founding_run(years: u32) -> (EventLog, PersistedState) {
    let config = SimulationConfig::default();
    let mut system = PopulationSystem::new(&config).unwrap();
    system.seed_population(base_population(&config).unwrap());
    let mut calendar = calendar_for(&system);
    let mut log = EventLog::new();
    run_years(&mut calendar, &mut system, years, &mut log).unwrap();
    (log, system.export_state())
}

#[test]
fn full_runs_are_deterministic() {
    let (first_log, first_state) = founding_run(2);
    let (second_log, second_state) = founding_run(2);
    assert!(first_log.count("population_tick") > 0);
    assert_eq!(first_log, second_log);
    assert_eq!(first_state, second_state);
}

#[test]
fn resuming_from_saved_state_matches_an_uninterrupted_run() {
    let config = SimulationConfig::default();

    let mut straight = PopulationSystem::new(&config).unwrap();
    straight.seed_population(base_population(&config).unwrap());
    let mut calendar = calendar_for(&straight);
    run_days(&mut calendar, &mut straight, 500, &mut NullSink).unwrap();

    let mut first_half = PopulationSystem::new(&config).unwrap();
    first_half.seed_population(base_population(&config).unwrap());
    let mut calendar = calendar_for(&first_half);
    run_days(&mut calendar, &mut first_half, 250, &mut NullSink).unwrap();
    let json = first_half.export_state().to_json().unwrap();

    let saved = PersistedState::from_json(&json).unwrap();
    let mut resumed = PopulationSystem::restore(&config, saved).unwrap();
    assert_eq!(resumed.today(), first_half.today());
    let mut calendar = calendar_for(&resumed);
    run_days(&mut calendar, &mut resumed, 250, &mut NullSink).unwrap();

    assert_eq!(resumed.today(), straight.today());
    assert_eq!(resumed.export_state(), straight.export_state());
}

#[test]
fn built_in_roster_passes_strict_validation() {
    let config = SimulationConfig::default();
    let mut system = PopulationSystem::new(&config).unwrap();
    let seeded = system.seed_population(base_population(&config).unwrap());
    assert_eq!(seeded, system.repository().living_count());
    assert!(system.repository().audit_indices().is_empty());

    let mut issues: Vec<ValidationIssue> = Vec::new();
    let report = system.validate(ValidationMode::Strict, &mut issues);
    assert_eq!(report.checked, seeded);
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");

    let assessments = system.assess_living();
    assert_eq!(assessments.len(), seeded);
}
