//! Event sinks for lifecycle notifications.
//!
//! The population system publishes every [`PopulationEvent`] to an
//! [`EventSink`] and never depends on who, if anyone, is listening.

use civitas_types::PopulationEvent;

/// Receiver of published lifecycle events.
pub trait EventSink {
    /// Called once per event, in publication order.
    fn publish(&mut self, event: &PopulationEvent);
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: &PopulationEvent) {}
}

/// A sink that logs every event at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&mut self, event: &PopulationEvent) {
        match event {
            PopulationEvent::PopulationTick(tick) => tracing::debug!(
                date = %tick.date,
                births = tick.births.len(),
                deaths = tick.deaths.len(),
                marriages = tick.marriages.len(),
                living = tick.living,
                "Population tick"
            ),
            other => tracing::debug!(
                kind = other.kind(),
                subject = ?other.subject(),
                "Population event"
            ),
        }
    }
}

/// A sink that records events in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<PopulationEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[PopulationEvent] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded events of one kind.
    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|event| event.kind() == kind).count()
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<PopulationEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: &PopulationEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards every event to two sinks.
pub struct Tee<'a> {
    first: &'a mut dyn EventSink,
    second: &'a mut dyn EventSink,
}

impl<'a> Tee<'a> {
    /// Forward to `first`, then `second`.
    pub fn new(first: &'a mut dyn EventSink, second: &'a mut dyn EventSink) -> Self {
        Self { first, second }
    }
}

impl EventSink for Tee<'_> {
    fn publish(&mut self, event: &PopulationEvent) {
        self.first.publish(event);
        self.second.publish(event);
    }
}
