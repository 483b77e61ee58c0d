//! Event delivery.
//!
//! The diplomacy core writes one [`DiplomaticEvent`] per affected party for
//! every state change. Events are staged inside the transaction and handed
//! to an [`EventSink`] only after the transaction commits; a rolled-back
//! operation emits nothing.

use chrono::Utc;
use concord_types::{DiplomaticEvent, DynastyId, EventId, EventType, TerritoryId, TreatyId, WarId};

/// Append-only receiver of committed diplomatic events.
///
/// The core never reads events back through this trait.
pub trait EventSink {
    /// Accept one committed event.
    fn record(&mut self, event: DiplomaticEvent);
}

/// In-memory [`EventSink`] that keeps every event in delivery order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DiplomaticEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[DiplomaticEvent] {
        &self.events
    }

    /// Events delivered to one dynasty.
    pub fn for_dynasty(&self, dynasty: DynastyId) -> Vec<&DiplomaticEvent> {
        self.events
            .iter()
            .filter(|e| e.dynasty_id == dynasty)
            .collect()
    }

    /// Events of one type.
    pub fn of_type(&self, event_type: EventType) -> Vec<&DiplomaticEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Number of events held.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return every event.
    pub fn drain(&mut self) -> Vec<DiplomaticEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: DiplomaticEvent) {
        self.events.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: DiplomaticEvent) {
        (**self).record(event);
    }
}

/// A pending event addressed to one dynasty.
///
/// The transaction fills in the recipient's year when the notice is staged.
#[derive(Debug, Clone)]
pub struct Notice {
    recipient: DynastyId,
    event_type: EventType,
    text: String,
    treaty_id: Option<TreatyId>,
    war_id: Option<WarId>,
    territory_id: Option<TerritoryId>,
    details: serde_json::Value,
}

impl Notice {
    /// Start a notice for `recipient`.
    pub fn new(recipient: DynastyId, event_type: EventType, text: impl Into<String>) -> Self {
        Self {
            recipient,
            event_type,
            text: text.into(),
            treaty_id: None,
            war_id: None,
            territory_id: None,
            details: serde_json::Value::Null,
        }
    }

    /// Link the notice to a treaty.
    #[must_use]
    pub const fn treaty(mut self, id: TreatyId) -> Self {
        self.treaty_id = Some(id);
        self
    }

    /// Link the notice to a war.
    #[must_use]
    pub const fn war(mut self, id: WarId) -> Self {
        self.war_id = Some(id);
        self
    }

    /// Link the notice to a territory.
    #[must_use]
    pub const fn territory(mut self, id: TerritoryId) -> Self {
        self.territory_id = Some(id);
        self
    }

    /// Attach a JSON payload.
    #[must_use]
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// The dynasty this notice is addressed to.
    pub const fn recipient(&self) -> DynastyId {
        self.recipient
    }

    /// Stamp the notice with the recipient's year.
    pub(crate) fn into_event(self, year: u32) -> DiplomaticEvent {
        DiplomaticEvent {
            id: EventId::new(),
            dynasty_id: self.recipient,
            year,
            text: self.text,
            event_type: self.event_type,
            treaty_id: self.treaty_id,
            war_id: self.war_id,
            territory_id: self.territory_id,
            details: self.details,
            recorded_at: Utc::now(),
        }
    }
}
