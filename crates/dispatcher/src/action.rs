//! The closed action verb catalog (spec §4.2).

use clawcity_types::{AgentId, BountyId, BusinessId, CoopActionId, DisguiseId, ItemId, JobId, PropertyId, ZoneId};
use clawcity_world::model::CoopActionType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrimeType {
    Theft,
    Burglary,
    Smuggling,
    Fraud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GambleRisk {
    Low,
    Med,
    High,
    Jackpot,
}

/// The full closed set of mutating actions an agent may submit to
/// `POST /agent/act`. Tagged on `action`, arguments nested under `args`,
/// matching the wire shape `{requestId, action, args}` from spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "args", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Move { to_zone: ZoneId },
    TakeJob { job_id: JobId },
    Buy { business_id: BusinessId, item_id: ItemId, qty: u64 },
    Sell { business_id: BusinessId, item_id: ItemId, qty: u64 },
    Heal,
    Rest,
    UseItem { item_id: ItemId },
    CommitCrime { crime_type: CrimeType },
    RobAgent { target_agent_id: AgentId },
    AttackAgent { target_agent_id: AgentId },
    InitiateCoopCrime { coop_type: CoopActionType, min_participants: u32, max_participants: u32, expires_in_ticks: u64 },
    JoinCoopAction { coop_action_id: CoopActionId },
    PlaceBounty { target_agent_id: AgentId, amount: Decimal },
    ClaimBounty { bounty_id: BountyId },
    Gamble { bet: Decimal, risk: GambleRisk },
    BuyDisguise { name: String },
    StealVehicle { vehicle_id: clawcity_types::VehicleId },
    AcceptContract { contract_id: clawcity_types::ContractId },
    AttemptJailbreak,
    BribeCops { amount: Decimal },
    SendMessage { to_agent_id: AgentId, body: String },
    SendFriendRequest { to_agent_id: AgentId },
    RespondFriendRequest { from_agent_id: AgentId, accept: bool },
    GiftCash { to_agent_id: AgentId, amount: Decimal },
    GiftItem { to_agent_id: AgentId, item_id: ItemId, qty: u64 },
    CreateGang { name: String },
    InviteToGang { agent_id: AgentId },
    RespondGangInvite { invite_id: uuid::Uuid, accept: bool },
    LeaveGang,
    ContributeToGang { amount: Decimal },
    ClaimTerritory { zone_id: ZoneId },
    BetrayGang,
    BuyProperty { property_id: PropertyId },
    RentProperty { property_id: PropertyId },
    SellProperty { property_id: PropertyId },
    StartBusiness { name: String },
    SetPrices { business_id: BusinessId, item_id: ItemId, price: Decimal },
    StockBusiness { business_id: BusinessId, item_id: ItemId, qty: u64, unit_price: Decimal },
}

impl ActionKind {
    /// Human-readable busy-action tag for `Agent.busy_action` (spec §3),
    /// distinguishing coop types as `coop_<type>` per spec §4.4.
    pub fn busy_tag(&self) -> &'static str {
        match self {
            ActionKind::Move { .. } => "move",
            ActionKind::TakeJob { .. } => "take_job",
            ActionKind::Heal => "heal",
            ActionKind::Rest => "rest",
            _ => "busy",
        }
    }
}
