//! Published numeric tables the spec references but does not pin to a single
//! value: crime loot/damage ranges, rob/attack percentages, the gamble
//! payout table, sentence lengths, and bounty bounds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::ops::RangeInclusive;

use crate::action::{CrimeType, GambleRisk};

pub const MOVE_HEAT_ON_RISK: i32 = 5;
pub const REST_DURATION_TICKS: u64 = 4;

pub const BOUNTY_MIN: Decimal = dec!(500);
pub const BOUNTY_MAX: Decimal = dec!(50_000);
pub const GANG_CREATION_COST: Decimal = dec!(5000);
pub const CLAIM_TERRITORY_COST: Decimal = dec!(2000);
pub const GANG_BETRAYAL_BAN_TICKS: u64 = 1000;

pub const ARREST_SENTENCE_TICKS: u64 = 20;
pub const ARREST_FINE: Decimal = dec!(200);
pub const HOSPITALIZATION_TICKS: u64 = 100;
pub const HEAL_MIN_TICKS: u64 = 2;
pub const HEAL_MAX_TICKS: u64 = 5;
pub const HEAL_COST_PER_HP: Decimal = dec!(3);

pub const ROB_SUCCESS_PCT_RANGE: RangeInclusive<f64> = 0.10..=0.25;
pub const ROB_FAIL_DAMAGE_RANGE: RangeInclusive<i32> = 5..=15;
pub const ROB_SUCCESS_HEAT: i32 = 25;
pub const ROB_FAIL_HEAT: i32 = 15;

pub const ATTACK_FAIL_DAMAGE_RANGE: RangeInclusive<i32> = 10..=30;
pub const ATTACK_SUCCESS_HEAT: i32 = 30;
pub const ATTACK_FAIL_HEAT: i32 = 20;
pub const ATTACK_KILL_CASH_TRANSFER_PCT: f64 = 0.25;

pub fn crime_loot_range(crime_type: CrimeType) -> RangeInclusive<Decimal> {
    match crime_type {
        CrimeType::Theft => dec!(50)..=dec!(200),
        CrimeType::Burglary => dec!(150)..=dec!(500),
        CrimeType::Smuggling => dec!(300)..=dec!(900),
        CrimeType::Fraud => dec!(100)..=dec!(600),
    }
}

pub fn crime_heat(crime_type: CrimeType) -> i32 {
    match crime_type {
        CrimeType::Theft => 10,
        CrimeType::Burglary => 15,
        CrimeType::Smuggling => 20,
        CrimeType::Fraud => 12,
    }
}

pub fn crime_fail_damage_range(crime_type: CrimeType) -> RangeInclusive<i32> {
    match crime_type {
        CrimeType::Theft => 5..=15,
        CrimeType::Burglary => 10..=25,
        CrimeType::Smuggling => 15..=35,
        CrimeType::Fraud => 5..=20,
    }
}

/// `(probability of a win, payout multiplier applied to the bet on a win)`.
pub fn gamble_table(risk: GambleRisk) -> (f64, Decimal) {
    match risk {
        GambleRisk::Low => (0.70, dec!(1.5)),
        GambleRisk::Med => (0.45, dec!(2.5)),
        GambleRisk::High => (0.20, dec!(6)),
        GambleRisk::Jackpot => (0.02, dec!(50)),
    }
}
