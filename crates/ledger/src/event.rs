//! The append-only event log.

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, EventId, Tick, ZoneId};
use serde::{Deserialize, Serialize};

/// Closed set of event types the engine can emit. New event kinds are added
/// here, never as a free-form string, so every downstream consumer (tests,
/// the event-index, `/agent/events`) stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    AgentRegistered,
    MoveCompleted,
    JobCompleted,
    Buy,
    Sell,
    HealCompleted,
    RestCompleted,
    ItemUsed,
    CrimeSuccess,
    CrimeFailed,
    AgentRobbed,
    RobAttemptFailed,
    AgentAttacked,
    AttackFailed,
    AgentKilled,
    AgentArrested,
    JailReleased,
    HospitalDischarged,
    JailbreakSucceeded,
    JailbreakFailed,
    BribeAccepted,
    BribeRejected,
    CoopActionInitiated,
    CoopActionJoined,
    CoopActionCancelled,
    CoopCrimeSuccess,
    CoopCrimeFailed,
    BountyPlaced,
    BountyClaimed,
    BountyExpired,
    GambleWon,
    GambleLost,
    DisguiseBought,
    DisguiseExpired,
    VehicleStolen,
    ContractAccepted,
    MessageSent,
    FriendRequestSent,
    FriendRequestAccepted,
    FriendshipEnded,
    GiftSent,
    GangCreated,
    GangInvited,
    GangInviteAccepted,
    GangInviteDeclined,
    GangLeft,
    GangContribution,
    GangBetrayed,
    TerritoryClaimed,
    TerritoryIncome,
    TerritoryLost,
    PropertyBought,
    PropertyRented,
    PropertySold,
    TenantEvicted,
    BusinessStarted,
    PricesSet,
    BusinessStocked,
    GovernmentTakedown,
    TickCompleted,
    TickFailed,
}

/// An immutable record in the world event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub tick: Tick,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub agent_id: Option<AgentId>,
    pub zone_id: Option<ZoneId>,
    /// Secondary entity this event concerns (gang, bounty, coop action, ...).
    pub entity_id: Option<uuid::Uuid>,
    pub payload: serde_json::Value,
    pub request_id: Option<String>,
}

impl Event {
    /// Total order used for `events.by_tick` and the `/agent/events` stream:
    /// `(tick, timestamp)` ascending.
    pub fn order_key(&self) -> (Tick, DateTime<Utc>) {
        (self.tick, self.timestamp)
    }
}
