//! Yield and bonus rules.
//!
//! Pure functions: deposit limits, the daily return, the referral bonus, and the
//! calendar-day boundary used for same-day idempotence.

use chrono::{DateTime, TimeZone, Utc};

use crate::account::Account;
use crate::cap::clamp_credit;
use crate::error::{LedgerError, Result};
use crate::money::apply_bps;

/// Minimum deposit (100.00).
pub const MIN_DEPOSIT_CENTS: i64 = 10_000;

/// Maximum single deposit (99,999,999.99).
pub const MAX_DEPOSIT_CENTS: i64 = 9_999_999_999;

/// Daily return rate: 0.6%.
pub const DAILY_RETURN_BPS: i64 = 60;

/// Referral bonus rate: 5% of the referee's deposit.
pub const REFERRAL_BONUS_BPS: i64 = 500;

/// Number of referee deposits (counted from the first) that pay a referral bonus.
pub const REFERRAL_BONUS_DEPOSIT_SLOTS: usize = 2;

/// A proposed credit and what survives the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
    /// Amount before the cap.
    pub nominal_cents: i64,
    /// Amount after clamping to remaining capacity.
    pub actual_cents: i64,
}

impl Credit {
    fn clamped(nominal_cents: i64, account: &Account) -> Self {
        Self {
            nominal_cents,
            actual_cents: clamp_credit(
                nominal_cents,
                account.total_invested_cents,
                account.total_earned_cents,
            ),
        }
    }

    /// Nothing to credit.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.actual_cents <= 0
    }

    /// The cap cut the credit short.
    #[must_use]
    pub const fn is_capped(&self) -> bool {
        self.actual_cents < self.nominal_cents
    }
}

/// Validate a deposit amount.
///
/// # Errors
///
/// Returns `DepositBelowMinimum` or `DepositAboveMaximum`.
pub fn validate_deposit(amount_cents: i64) -> Result<i64> {
    if amount_cents < MIN_DEPOSIT_CENTS {
        return Err(LedgerError::DepositBelowMinimum {
            amount_cents,
            minimum_cents: MIN_DEPOSIT_CENTS,
        });
    }
    if amount_cents > MAX_DEPOSIT_CENTS {
        return Err(LedgerError::DepositAboveMaximum {
            amount_cents,
            maximum_cents: MAX_DEPOSIT_CENTS,
        });
    }
    Ok(amount_cents)
}

/// Today's yield for an account, clamped to its cap.
#[must_use]
pub fn daily_return(account: &Account) -> Credit {
    Credit::clamped(
        apply_bps(account.total_invested_cents, DAILY_RETURN_BPS),
        account,
    )
}

/// Bonus owed to `referrer` for a referee deposit, clamped to the referrer's cap.
#[must_use]
pub fn referral_bonus(referrer: &Account, deposit_cents: i64) -> Credit {
    Credit::clamped(apply_bps(deposit_cents, REFERRAL_BONUS_BPS), referrer)
}

/// Whether a deposit preceded by `prior_deposits` deposits pays a referral bonus.
#[must_use]
pub const fn earns_referral_bonus(prior_deposits: usize) -> bool {
    prior_deposits < REFERRAL_BONUS_DEPOSIT_SLOTS
}

/// Start of the calendar day containing `now`, in the server's local time zone.
#[must_use]
pub fn start_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day_in(now, &chrono::Local)
}

/// Start of the calendar day containing `now`, in the given time zone.
///
/// Falls back to 01:00 when midnight does not exist locally.
#[must_use]
pub fn start_of_day_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let date = now.with_timezone(tz).date_naive();

    [0, 1]
        .into_iter()
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or(now, |start| start.with_timezone(&Utc))
}
