//! Earnings cap calculator.
//!
//! An account may never earn more than `EARNINGS_CAP_MULTIPLE` times what it has invested.
//! Both the daily return and the referral bonus clamp their proposed credit here.

/// Lifetime earnings multiple of invested principal.
pub const EARNINGS_CAP_MULTIPLE: i64 = 3;

/// Maximum lifetime earnings for the given invested total.
#[must_use]
pub const fn earnings_cap(total_invested_cents: i64) -> i64 {
    total_invested_cents.saturating_mul(EARNINGS_CAP_MULTIPLE)
}

/// Remaining earnable capacity: `max(0, invested * 3 - earned)`.
#[must_use]
pub fn remaining_capacity(total_invested_cents: i64, total_earned_cents: i64) -> i64 {
    earnings_cap(total_invested_cents)
        .saturating_sub(total_earned_cents)
        .max(0)
}

/// Clamp a proposed credit to the remaining capacity, floored at zero.
#[must_use]
pub fn clamp_credit(nominal_cents: i64, total_invested_cents: i64, total_earned_cents: i64) -> i64 {
    nominal_cents
        .min(remaining_capacity(total_invested_cents, total_earned_cents))
        .max(0)
}
