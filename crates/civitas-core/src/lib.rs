//! Calendar, orchestration, persistence, and seeding for the Civitas
//! simulation.
//!
//! This crate wires the population services and the political pipeline
//! into a running simulation driven by a day-by-day calendar.
//!
//! # Modules
//!
//! - [`bus`] -- [`EventSink`] trait plus the null, tracing, and in-memory
//!   sinks.
//! - [`calendar`] -- Fixed 365-day calendar and its day, month, and year
//!   notifications.
//! - [`config`] -- Configuration loading from `civitas-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`SimulationError`], wrapping every failure below.
//! - [`orchestrator`] -- [`PopulationSystem`], which runs the daily and
//!   annual passes.
//! - [`persistence`] -- [`PersistedState`] save and load.
//! - [`roster`] -- The built-in founding families.
//! - [`runner`] -- Day and year loops over the calendar.
//! - [`seeding`] -- Base population loading from roster JSON.
//!
//! [`EventSink`]: bus::EventSink
//! [`SimulationError`]: error::SimulationError
//! [`PopulationSystem`]: orchestrator::PopulationSystem
//! [`PersistedState`]: persistence::PersistedState

pub mod bus;
pub mod calendar;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod persistence;
pub mod roster;
pub mod runner;
pub mod seeding;
