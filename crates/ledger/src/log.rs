//! `EventLog`: the `Emit` API of spec §4.5.
//!
//! Grounded on `agentkern-arbiter::audit::AuditLedger`'s indexed append log,
//! with one deliberate difference: that audit ledger prunes past
//! `DEFAULT_MAX_RECORDS`, but spec §3 requires events to be an immortal
//! monotone log, so this log never prunes.

use std::collections::HashMap;

use chrono::Utc;
use clawcity_types::{AgentId, EventId, Tick, ZoneId};
use uuid::Uuid;

use crate::event::{Event, EventType};

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    by_tick: HashMap<Tick, Vec<usize>>,
    by_type: HashMap<EventType, Vec<usize>>,
    by_agent: HashMap<AgentId, Vec<usize>>,
    by_request_id: HashMap<String, Vec<usize>>,
}

#[derive(Debug, Clone)]
pub struct EmitArgs {
    pub tick: Tick,
    pub event_type: EventType,
    pub agent_id: Option<AgentId>,
    pub zone_id: Option<ZoneId>,
    pub entity_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub request_id: Option<String>,
}

impl EmitArgs {
    pub fn new(tick: Tick, event_type: EventType) -> Self {
        Self {
            tick,
            event_type,
            agent_id: None,
            zone_id: None,
            entity_id: None,
            payload: serde_json::Value::Null,
            request_id: None,
        }
    }

    pub fn agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn zone(mut self, zone_id: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    pub fn entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its id. Events are never updated or
    /// removed once emitted.
    pub fn emit(&mut self, args: EmitArgs) -> EventId {
        let event = Event {
            id: Uuid::new_v4(),
            tick: args.tick,
            timestamp: Utc::now(),
            event_type: args.event_type,
            agent_id: args.agent_id,
            zone_id: args.zone_id,
            entity_id: args.entity_id,
            payload: args.payload,
            request_id: args.request_id,
        };
        let id = event.id;
        let index = self.events.len();

        self.by_tick.entry(event.tick).or_default().push(index);
        self.by_type.entry(event.event_type).or_default().push(index);
        if let Some(agent_id) = event.agent_id {
            self.by_agent.entry(agent_id).or_default().push(index);
        }
        if let Some(request_id) = event.request_id.clone() {
            self.by_request_id.entry(request_id).or_default().push(index);
        }

        tracing::debug!(?event.event_type, tick = event.tick, "event emitted");
        self.events.push(event);
        id
    }

    pub fn for_agent(&self, agent_id: AgentId) -> Vec<&Event> {
        self.by_agent
            .get(&agent_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.events[i])
            .collect()
    }

    pub fn for_type(&self, event_type: EventType) -> Vec<&Event> {
        self.by_type
            .get(&event_type)
            .into_iter()
            .flatten()
            .map(|&i| &self.events[i])
            .collect()
    }

    pub fn for_request_id(&self, request_id: &str) -> Vec<&Event> {
        self.by_request_id
            .get(request_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.events[i])
            .collect()
    }

    /// Events for an agent with `tick > since_tick`, newest first, capped at
    /// `limit` — backs `GET /agent/events?sinceTick&limit`.
    pub fn for_agent_since(&self, agent_id: AgentId, since_tick: Tick, limit: usize) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .for_agent(agent_id)
            .into_iter()
            .filter(|e| e.tick > since_tick)
            .collect();
        events.sort_by(|a, b| b.order_key().cmp(&a.order_key()));
        events.truncate(limit);
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Verify the monotonicity invariant (spec §8 invariant 3): events in
    /// insertion order must have non-decreasing `(tick, timestamp)`.
    pub fn is_monotone(&self) -> bool {
        self.events.windows(2).all(|w| w[0].order_key() <= w[1].order_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_indexes_by_agent_and_type() {
        let mut log = EventLog::new();
        let agent = Uuid::new_v4();
        log.emit(EmitArgs::new(1, EventType::MoveCompleted).agent(agent));
        log.emit(EmitArgs::new(2, EventType::JobCompleted).agent(agent));

        assert_eq!(log.for_agent(agent).len(), 2);
        assert_eq!(log.for_type(EventType::MoveCompleted).len(), 1);
        assert!(log.is_monotone());
    }

    #[test]
    fn since_tick_window_is_newest_first() {
        let mut log = EventLog::new();
        let agent = Uuid::new_v4();
        for tick in 1..=5 {
            log.emit(EmitArgs::new(tick, EventType::MoveCompleted).agent(agent));
        }
        let recent = log.for_agent_since(agent, 2, 10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].tick, 5);
        assert_eq!(recent[2].tick, 3);
    }

    #[test]
    fn duplicate_request_id_returns_both_matches() {
        let mut log = EventLog::new();
        log.emit(EmitArgs::new(1, EventType::CrimeSuccess).request_id("r1"));
        assert_eq!(log.for_request_id("r1").len(), 1);
    }
}
