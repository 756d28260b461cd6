//! Simulation binary for Civitas.
//!
//! Loads configuration, seeds the founding families (or resumes from a
//! saved state), runs the calendar for the configured number of years, and
//! writes the final state back to disk.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `civitas-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Resume from saved state, or build a fresh population and run the
//!    opening year's annual pass
//! 4. Normalize the seeded records
//! 5. Run the calendar
//! 6. Log the final census
//! 7. Save state

mod error;

use std::path::{Path, PathBuf};

use civitas_core::bus::TracingSink;
use civitas_core::config::{LoggingConfig, SimulationConfig};
use civitas_core::orchestrator::PopulationSystem;
use civitas_core::persistence::PersistedState;
use civitas_core::runner::{calendar_for, run_years};
use civitas_core::seeding::base_population;
use civitas_population::{IssueSink, ValidationIssue, ValidationMode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const DEFAULT_CONFIG_PATH: &str = "civitas-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seeding, the run itself, or saving
/// state fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so the fallback is
    //    reported once the subscriber exists.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("civitas-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration file read");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        start = %config.start_date()?,
        years = config.world.years,
        "Configuration loaded"
    );

    let mut sink = TracingSink;

    // 3. Resume or seed.
    let mut system = if let Some(path) = &config.persistence.resume_from {
        let state = PersistedState::load(path)?;
        let system = PopulationSystem::restore(&config, state)?;
        info!(
            date = %system.today(),
            living = system.repository().living_count(),
            "Resumed from saved state"
        );
        system
    } else {
        let mut system = PopulationSystem::new(&config)?;
        let seeded = system.seed_population(base_population(&config)?);
        if seeded == 0 {
            warn!("Starting with an empty population");
        }
        let changed = system.run_annual(system.today().year, &mut sink)?;
        info!(seeded, changed, "Founding population ready");
        system
    };

    // 4. Normalize whatever the roster or the save carried in.
    let mut issues = LoggedIssues;
    let report = system.validate(ValidationMode::Normalize, &mut issues);
    info!(
        checked = report.checked,
        issues = report.issues,
        corrected = report.corrected,
        "Records validated"
    );

    // 5. Run the calendar.
    let mut calendar = calendar_for(&system);
    run_years(&mut calendar, &mut system, config.world.years, &mut sink)?;

    // 6. Final census.
    let snapshot = system.snapshot();
    info!(
        date = %snapshot.date,
        living = snapshot.living,
        dead_retained = snapshot.dead_retained,
        married = snapshot.married,
        by_class = ?snapshot.by_class,
        by_faction = ?snapshot.by_faction,
        "Final census"
    );

    // 7. Save state.
    if let Some(path) = &config.persistence.state_path {
        system.export_state().save(path)?;
    }

    info!("civitas-engine finished");
    Ok(())
}

/// Read the config file at `path`, or fall back to defaults when it does
/// not exist. The flag reports which happened.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?,
    };
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
    Ok(())
}

/// Writes each validation finding to the log.
struct LoggedIssues;

impl IssueSink for LoggedIssues {
    fn report(&mut self, issue: ValidationIssue) {
        warn!(
            id = %issue.id,
            kind = ?issue.kind,
            corrected = issue.corrected,
            detail = issue.detail,
            "Validation issue"
        );
    }
}
