//! Day and year loop driving the population system from the calendar.
//!
//! [`run_days`] advances the calendar one day at a time and dispatches every
//! notification it reports to the [`PopulationSystem`]. A run ends when the
//! requested number of days has passed or nobody is left alive.

use tracing::{info, warn};

use civitas_types::{DAYS_PER_YEAR, SimDate};

use crate::bus::EventSink;
use crate::calendar::{Calendar, CalendarNotification};
use crate::error::SimulationError;
use crate::orchestrator::PopulationSystem;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Every requested day was processed.
    Completed,
    /// The last living character died.
    Extinction,
}

/// Totals for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the run stopped.
    pub end_reason: RunEndReason,
    /// Days processed.
    pub days: u64,
    /// New years crossed.
    pub years: u32,
    /// Children born.
    pub births: usize,
    /// Characters who died.
    pub deaths: usize,
    /// Marriages made.
    pub marriages: usize,
    /// The last day processed.
    pub final_date: SimDate,
    /// Living characters at the end.
    pub living: usize,
}

/// A calendar standing on the system's current day.
pub const fn calendar_for(system: &PopulationSystem) -> Calendar {
    Calendar::new(system.today())
}

/// Advance `days` days, dispatching every notification to `system`.
///
/// # Errors
///
/// Returns [`SimulationError`] if the calendar overflows or a lifecycle
/// pass fails. Days already processed stay applied.
pub fn run_days(
    calendar: &mut Calendar,
    system: &mut PopulationSystem,
    days: u64,
    sink: &mut dyn EventSink,
) -> Result<RunSummary, SimulationError> {
    if calendar.today() != system.today() {
        warn!(
            calendar = %calendar.today(),
            system = %system.today(),
            "Calendar and population system disagree on the date"
        );
    }
    info!(days, start = %calendar.today(), "Run starting");

    let mut summary = RunSummary {
        end_reason: RunEndReason::Completed,
        days: 0,
        years: 0,
        births: 0,
        deaths: 0,
        marriages: 0,
        final_date: calendar.today(),
        living: system.repository().living_count(),
    };

    for _ in 0..days {
        for notification in calendar.advance()? {
            if matches!(notification, CalendarNotification::NewYear(_)) {
                summary.years = summary.years.saturating_add(1);
            }
            if let Some(tick) = system.handle(notification, sink)? {
                summary.births = summary.births.saturating_add(tick.births.len());
                summary.deaths = summary.deaths.saturating_add(tick.deaths.len());
                summary.marriages = summary.marriages.saturating_add(tick.marriages.len());
                summary.living = tick.living;
            }
        }
        summary.days = summary.days.saturating_add(1);
        summary.final_date = calendar.today();
        if summary.living == 0 {
            info!(date = %summary.final_date, "Nobody left alive");
            summary.end_reason = RunEndReason::Extinction;
            break;
        }
    }

    log_run_end(&summary);
    Ok(summary)
}

/// Advance whole years of [`DAYS_PER_YEAR`] days.
///
/// # Errors
///
/// Returns [`SimulationError`] as [`run_days`] does.
pub fn run_years(
    calendar: &mut Calendar,
    system: &mut PopulationSystem,
    years: u32,
    sink: &mut dyn EventSink,
) -> Result<RunSummary, SimulationError> {
    let days = u64::from(years).saturating_mul(u64::from(DAYS_PER_YEAR));
    run_days(calendar, system, days, sink)
}

/// Log the outcome of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        days = summary.days,
        years = summary.years,
        births = summary.births,
        deaths = summary.deaths,
        marriages = summary.marriages,
        living = summary.living,
        date = %summary.final_date,
        "Run ended"
    );
}
