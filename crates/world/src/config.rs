//! Tunable world parameters (spec §9 Open Questions, §4.1, §4.3).
//!
//! Every numeric constant the simulation loop depends on lives here rather
//! than scattered through the phase implementations, and every field can be
//! overridden by an environment variable at startup so operators can retune
//! the world without a rebuild.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Wall-clock duration of one tick, in milliseconds.
    pub tick_ms: u64,
    /// Lower bound of the uniform range a newly registered agent's starting
    /// cash is drawn from.
    pub starting_cash_min: Decimal,
    /// Upper bound of that range.
    pub starting_cash_max: Decimal,
    /// Zone slug a newly registered agent starts in.
    pub starting_zone_id: String,
    /// Max value `Agent::heat` can reach.
    pub max_heat: i32,
    /// Heat decay applied to an idle agent per tick.
    pub heat_decay_idle: i32,
    /// Heat decay applied to a busy (non-idle) agent per tick.
    pub heat_decay_busy: i32,
    /// Heat level at or above which the per-tick arrest check runs.
    pub arrest_threshold_heat: i32,
    /// Period, in ticks, between NPC policy decision passes.
    pub npc_decision_period_ticks: u64,
    /// Ticks between a coop action reaching `Ready` and its execution.
    pub coop_execute_delay_ticks: u64,
    /// Ticks a bounty remains `Active` after being placed.
    pub bounty_expiry_ticks: u64,
    /// Default ticks a disguise remains usable after purchase.
    pub disguise_duration_ticks: u64,
    /// Friendship `strength`/`loyalty` decay per tick of no interaction.
    pub friendship_decay_per_tick: i32,
    /// `police_presence` band, inclusive, that marks a zone as a hot zone
    /// for the purposes of elevated arrest risk.
    pub hot_zone_police_presence_min: f32,
    /// Weight of zone `police_presence` in the arrest-probability formula.
    pub arrest_police_weight: f32,
    /// Weight of agent `heat` (normalized to `max_heat`) in the same formula.
    pub arrest_heat_weight: f32,
    /// Baseline success probability for a solo crime before skill/heat
    /// adjustments.
    pub crime_base_success: f32,
    /// Per-point stealth skill bonus added to crime/coop-crime success.
    pub crime_stealth_bonus_per_point: f32,
    /// Per-point combat skill bonus added to attack success.
    pub combat_base_success: f32,
    pub combat_skill_bonus_per_point: f32,
    /// House edge subtracted from a 50/50 gamble, i.e. true win probability.
    pub gamble_house_edge: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tick_ms: 15_000,
            starting_cash_min: dec!(50),
            starting_cash_max: dec!(1000),
            starting_zone_id: "residential".to_string(),
            max_heat: 100,
            heat_decay_idle: 2,
            heat_decay_busy: 1,
            arrest_threshold_heat: 70,
            npc_decision_period_ticks: 5,
            coop_execute_delay_ticks: 3,
            bounty_expiry_ticks: 2_880,
            disguise_duration_ticks: 1_440,
            friendship_decay_per_tick: 1,
            hot_zone_police_presence_min: 0.6,
            arrest_police_weight: 0.5,
            arrest_heat_weight: 0.5,
            crime_base_success: 0.55,
            crime_stealth_bonus_per_point: 0.03,
            combat_base_success: 0.5,
            combat_skill_bonus_per_point: 0.03,
            gamble_house_edge: 0.05,
        }
    }
}

macro_rules! override_from_env {
    ($cfg:expr, $field:ident, $key:literal, $parse:expr) => {
        if let Ok(raw) = std::env::var($key) {
            match $parse(raw.as_str()) {
                Ok(value) => $cfg.$field = value,
                Err(_) => tracing::warn!(key = $key, raw, "ignoring unparsable env override"),
            }
        }
    };
}

impl WorldConfig {
    /// Build a config starting from [`Default`] and layering on any present
    /// `CLAWCITY_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        override_from_env!(cfg, tick_ms, "CLAWCITY_TICK_MS", |s: &str| s.parse::<u64>());
        override_from_env!(
            cfg,
            starting_cash_min,
            "CLAWCITY_STARTING_CASH_MIN",
            |s: &str| s.parse::<Decimal>()
        );
        override_from_env!(
            cfg,
            starting_cash_max,
            "CLAWCITY_STARTING_CASH_MAX",
            |s: &str| s.parse::<Decimal>()
        );
        if let Ok(zone) = std::env::var("CLAWCITY_STARTING_ZONE_ID") {
            cfg.starting_zone_id = zone;
        }
        override_from_env!(cfg, max_heat, "CLAWCITY_MAX_HEAT", |s: &str| s.parse::<i32>());
        override_from_env!(cfg, arrest_threshold_heat, "CLAWCITY_ARREST_THRESHOLD_HEAT", |s: &str| s
            .parse::<i32>());
        override_from_env!(
            cfg,
            npc_decision_period_ticks,
            "CLAWCITY_NPC_DECISION_PERIOD_TICKS",
            |s: &str| s.parse::<u64>()
        );
        override_from_env!(cfg, bounty_expiry_ticks, "CLAWCITY_BOUNTY_EXPIRY_TICKS", |s: &str| s
            .parse::<u64>());
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = WorldConfig::default();
        assert!(cfg.max_heat > cfg.arrest_threshold_heat);
        assert!(cfg.heat_decay_idle >= cfg.heat_decay_busy);
        assert!(cfg.gamble_house_edge < 0.5);
    }
}
