//! The population system: the orchestrator that turns calendar
//! notifications into lifecycle passes.
//!
//! Each new day runs, in order:
//!
//! 1. **Birthdays** -- every living character born on this month and day
//!    ages one year.
//! 2. **Mortality** -- the mortality service selects the day's deaths, which
//!    are committed here and published as `CharacterDied`.
//! 3. **Births** -- eligible married women conceive; newborns are stored
//!    and published as `CharacterBorn`.
//! 4. **Marriage** -- daily matchmaking; each couple is published as
//!    `CharacterMarried`.
//! 5. **Summary** -- one `PopulationTick` with the day's births, deaths,
//!    and marriages.
//!
//! Each new year runs the annual career pass and publishes its events.
//! A day is processed to completion before the next one begins.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use civitas_politics::PoliticalAssessment;
use civitas_population::{
    AnnualEvolution, BirthService, CharacterRepository, CharacterValidator, FamilyLookup,
    HazardTable, IdAllocator, IssueSink, MarriageService, MortalityService, RomanNamingRules,
    SeededRng, ValidationMode, ValidationReport,
};
use civitas_types::{
    Character, CharacterDiedDetails, CharacterId, CharacterMarriedDetails, Faction,
    PopulationEvent, PopulationTickDetails, SimDate, SocialClass,
};

use crate::bus::EventSink;
use crate::calendar::CalendarNotification;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::persistence::{PersistedState, STATE_VERSION, StreamStates};

/// Aggregate counts describing the population on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationSnapshot {
    /// The day described.
    pub date: SimDate,
    /// Living characters.
    pub living: usize,
    /// Dead characters retained for historical queries.
    pub dead_retained: usize,
    /// Living characters with a spouse on record.
    pub married: usize,
    /// Living characters per social class.
    pub by_class: BTreeMap<SocialClass, usize>,
    /// Living characters per faction.
    pub by_faction: BTreeMap<Faction, usize>,
}

/// Owns the population and every lifecycle service.
#[derive(Debug)]
pub struct PopulationSystem {
    repository: CharacterRepository,
    mortality: MortalityService<HazardTable>,
    marriage: MarriageService,
    births: BirthService,
    annual: AnnualEvolution,
    ids: IdAllocator,
    naming: RomanNamingRules,
    naming_seed: u64,
    keep_dead: bool,
    today: SimDate,
}

impl PopulationSystem {
    /// Build an empty system from configuration.
    ///
    /// The system stands on the configured start date; the first processed
    /// day is the one after it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the start date or any lifecycle
    /// section is invalid.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let today = config.start_date()?;
        let hazard = HazardTable::from_bands(&config.mortality.bands)?;
        let mortality = MortalityService::new(hazard, SeededRng::from_seed(config.mortality_seed()));
        let marriage = MarriageService::new(
            config.marriage.clone(),
            SeededRng::from_seed(config.marriage_seed()),
        )?;
        let births = BirthService::new(
            config.births.clone(),
            SeededRng::from_seed(config.birth_seed()),
        )?;
        debug!(
            hazard_bands = mortality.hazard().len(),
            birth_daily = births.daily_probability(),
            %today,
            "Population system configured"
        );
        Ok(Self {
            repository: CharacterRepository::new(),
            mortality,
            marriage,
            births,
            annual: AnnualEvolution::new(config.careers),
            ids: IdAllocator::default(),
            naming: RomanNamingRules,
            naming_seed: config.naming_seed(),
            keep_dead: config.world.keep_dead,
            today,
        })
    }

    /// Insert a starting population. Returns the number inserted.
    ///
    /// The ID allocator moves past every inserted ID so births never reuse
    /// one.
    pub fn seed_population(&mut self, characters: Vec<Character>) -> usize {
        let count = characters.len();
        for character in characters {
            self.ids.observe(character.id);
            self.repository.add(character, self.keep_dead);
        }
        info!(
            seeded = count,
            living = self.repository.living_count(),
            next_id = %self.ids.peek(),
            "Population seeded"
        );
        count
    }

    /// Dispatch one calendar notification.
    ///
    /// Returns the day's summary for `NewDay`, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Population`] if a lifecycle pass fails.
    pub fn handle(
        &mut self,
        notification: CalendarNotification,
        sink: &mut dyn EventSink,
    ) -> Result<Option<PopulationTickDetails>, SimulationError> {
        match notification {
            CalendarNotification::NewYear(year) => {
                self.run_annual(year, sink)?;
                Ok(None)
            }
            CalendarNotification::NewMonth { year, month } => {
                debug!(year, month, living = self.repository.living_count(), "New month");
                Ok(None)
            }
            CalendarNotification::NewDay(date) => self.run_daily(date, sink).map(Some),
        }
    }

    /// Run the daily pass for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Population`] if births or marriages fail
    /// to commit.
    pub fn run_daily(
        &mut self,
        date: SimDate,
        sink: &mut dyn EventSink,
    ) -> Result<PopulationTickDetails, SimulationError> {
        self.today = date;
        let aged = self.repository.age_up_birthdays(date.month, date.day);

        let selected = self.mortality.select_deaths(&self.repository);
        let mut deaths = Vec::with_capacity(selected.len());
        for id in selected {
            let Some(character) = self.repository.mark_dead(id, self.keep_dead) else {
                warn!(%id, "Selected death for a character no longer living");
                continue;
            };
            let details = CharacterDiedDetails {
                character: id,
                name: character.full_name(),
                age: character.age,
                date,
            };
            debug!(%id, name = %details.name, age = details.age, "Character died");
            sink.publish(&PopulationEvent::CharacterDied(details));
            deaths.push(id);
        }

        let born = self
            .births
            .run_daily(&mut self.repository, &mut self.ids, &self.naming, date)?;
        let mut births = Vec::with_capacity(born.len());
        for details in born {
            births.push(details.child);
            sink.publish(&PopulationEvent::CharacterBorn(details));
        }

        let marriages = self.marriage.run_daily(&mut self.repository)?;
        for pair in &marriages {
            sink.publish(&PopulationEvent::CharacterMarried(CharacterMarriedDetails {
                pair: *pair,
                date,
            }));
        }

        let tick = PopulationTickDetails {
            date,
            births,
            deaths,
            marriages,
            living: self.repository.living_count(),
        };
        if !tick.births.is_empty() || !tick.deaths.is_empty() || !tick.marriages.is_empty() {
            debug!(
                %date,
                aged = aged.len(),
                births = tick.births.len(),
                deaths = tick.deaths.len(),
                marriages = tick.marriages.len(),
                living = tick.living,
                "Daily pass complete"
            );
        }
        sink.publish(&PopulationEvent::PopulationTick(tick.clone()));
        Ok(tick)
    }

    /// Run the annual career pass for `year`. Returns the number of events
    /// published.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Population`] if a record cannot be
    /// updated.
    pub fn run_annual(
        &mut self,
        year: i32,
        sink: &mut dyn EventSink,
    ) -> Result<usize, SimulationError> {
        let events = self.annual.run(&mut self.repository, year)?;
        for event in &events {
            sink.publish(event);
        }
        info!(
            year,
            living = self.repository.living_count(),
            events = events.len(),
            "Annual pass complete"
        );
        Ok(events.len())
    }

    /// Aggregate counts for the current day.
    pub fn snapshot(&self) -> PopulationSnapshot {
        let living = self.repository.get_all_living();
        let mut by_class = BTreeMap::new();
        let mut by_faction = BTreeMap::new();
        let mut married = 0_usize;
        for character in &living {
            let class = by_class.entry(character.social_class).or_insert(0_usize);
            *class = class.saturating_add(1);
            let faction = by_faction.entry(character.faction).or_insert(0_usize);
            *faction = faction.saturating_add(1);
            if character.is_married() {
                married = married.saturating_add(1);
            }
        }
        PopulationSnapshot {
            date: self.today,
            living: living.len(),
            dead_retained: self.repository.dead_ids().len(),
            married,
            by_class,
            by_faction,
        }
    }

    /// Run the political pipeline over every living character, in ID order.
    pub fn assess_living(&self) -> Vec<PoliticalAssessment> {
        civitas_politics::assess_all(self.repository.get_all_living())
    }

    /// Validate every stored character.
    ///
    /// Strict mode only reports; normalize mode repairs in place. Neither
    /// touches the lifecycle random streams.
    pub fn validate(&mut self, mode: ValidationMode, sink: &mut dyn IssueSink) -> ValidationReport {
        let validator = CharacterValidator::new(&self.naming, self.naming_seed);
        validator.validate_repository(&mut self.repository, mode, sink)
    }

    /// Capture everything needed to resume from the current day.
    pub fn export_state(&self) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            date: self.today,
            characters: self.repository.iter().cloned().collect(),
            living_ids: self.repository.living_ids().into_iter().collect(),
            dead_ids: self.repository.dead_ids().into_iter().collect(),
            keep_dead: self.keep_dead,
            streams: StreamStates {
                mortality: self.mortality.rng_state(),
                marriage: self.marriage.rng_state(),
                births: self.births.rng_state(),
            },
            next_id: self.ids.peek(),
        }
    }

    /// Rebuild a system from configuration and saved state.
    ///
    /// Rules and thresholds come from `config`; the population, stream
    /// positions, date, and next ID come from `state`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the configuration is invalid.
    pub fn restore(config: &SimulationConfig, state: PersistedState) -> Result<Self, SimulationError> {
        let mut system = Self::new(config)?;
        system.keep_dead = state.keep_dead;
        system.today = state.date;
        system.mortality.restore_rng(state.streams.mortality);
        system.marriage.restore_rng(state.streams.marriage);
        system.births.restore_rng(state.streams.births);
        system.ids = IdAllocator::starting_at(state.next_id);

        for character in state.characters {
            system.ids.observe(character.id);
            system.repository.add(character, true);
        }
        let unknown =
            system
                .repository
                .apply_life_state(&state.living_ids, &state.dead_ids, state.keep_dead);
        if unknown > 0 {
            warn!(unknown, "Saved state lists IDs with no stored character");
        }
        info!(
            date = %system.today,
            living = system.repository.living_count(),
            dead_retained = system.repository.dead_ids().len(),
            "Population system restored"
        );
        Ok(system)
    }

    /// The population store.
    pub const fn repository(&self) -> &CharacterRepository {
        &self.repository
    }

    /// Family queries over the store.
    pub const fn family(&self) -> FamilyLookup<'_> {
        FamilyLookup::new(&self.repository)
    }

    /// The last day processed, or the start date before any.
    pub const fn today(&self) -> SimDate {
        self.today
    }

    /// The ID the next newborn will receive.
    pub const fn next_id(&self) -> CharacterId {
        self.ids.peek()
    }

    /// Whether dead characters are retained.
    pub const fn keep_dead(&self) -> bool {
        self.keep_dead
    }

    /// IDs of every living character, ascending.
    pub fn living_ids(&self) -> BTreeSet<CharacterId> {
        self.repository.living_ids().into_iter().collect()
    }
}
