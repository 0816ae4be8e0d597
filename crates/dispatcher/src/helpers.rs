//! Small shared helpers used across handlers.

use clawcity_types::{Amount, ErrorCode};
use rand::Rng;
use rust_decimal::Decimal;
use std::ops::RangeInclusive;

pub fn roll_bernoulli(p: f64) -> bool {
    rand::rng().random_bool(p.clamp(0.0, 1.0))
}

pub fn rand_i32(range: RangeInclusive<i32>) -> i32 {
    rand::rng().random_range(range)
}

/// Uniform draw over a `Decimal` range at cent precision.
pub fn rand_decimal(range: RangeInclusive<Decimal>) -> Decimal {
    let (lo, hi) = (*range.start(), *range.end());
    let lo_cents = (lo * Decimal::ONE_HUNDRED).round().try_into().unwrap_or(0i64);
    let hi_cents = (hi * Decimal::ONE_HUNDRED).round().try_into().unwrap_or(0i64);
    let cents = if hi_cents > lo_cents { rand::rng().random_range(lo_cents..=hi_cents) } else { lo_cents };
    Decimal::new(cents, 2)
}

pub fn pct_of(amount: Amount, pct: f64) -> Amount {
    amount * Decimal::try_from(pct).unwrap_or(Decimal::ZERO)
}

pub fn require_non_empty(s: &str) -> Result<(), ErrorCode> {
    if s.trim().is_empty() {
        Err(ErrorCode::BadArgs)
    } else {
        Ok(())
    }
}
