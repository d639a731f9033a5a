//! Journal entries for yieldcap.
//!
//! The journal is append-only: a `Transaction` is never updated or deleted once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AccountId, TransactionId};

/// Description written on every daily return.
pub const DAILY_RETURN_DESCRIPTION: &str = "Daily Return (0.6%)";

/// Description written on every deposit.
pub const DEPOSIT_DESCRIPTION: &str = "Deposit";

/// A single journal entry on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequential transaction id.
    pub id: TransactionId,

    /// The account this entry belongs to.
    pub account_id: AccountId,

    /// Kind of entry.
    pub kind: TransactionKind,

    /// Positive amount in cents.
    pub amount_cents: i64,

    /// Informational annotation.
    pub description: String,

    /// Creation time; also the "already credited today" signal.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a deposit entry.
    #[must_use]
    pub fn deposit(
        id: TransactionId,
        account_id: AccountId,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            kind: TransactionKind::Deposit,
            amount_cents,
            description: DEPOSIT_DESCRIPTION.to_string(),
            created_at: now,
        }
    }

    /// Create a daily return entry.
    #[must_use]
    pub fn daily_return(
        id: TransactionId,
        account_id: AccountId,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            kind: TransactionKind::DailyReturn,
            amount_cents,
            description: DAILY_RETURN_DESCRIPTION.to_string(),
            created_at: now,
        }
    }

    /// Create a referral bonus entry on the referrer's account.
    #[must_use]
    pub fn referral_bonus(
        id: TransactionId,
        referrer_id: AccountId,
        amount_cents: i64,
        referee_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id: referrer_id,
            kind: TransactionKind::ReferralBonus,
            amount_cents,
            description: format!("Bonus from {referee_name} deposit"),
            created_at: now,
        }
    }
}

/// Kind of journal entry. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Principal deposited by the account holder.
    Deposit,

    /// Daily yield credit.
    DailyReturn,

    /// Bonus credited to a referrer.
    ReferralBonus,
}

impl TransactionKind {
    /// Whether this kind counts towards `total_earned`.
    #[must_use]
    pub const fn is_earning(self) -> bool {
        matches!(self, Self::DailyReturn | Self::ReferralBonus)
    }

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::DailyReturn => "DAILY_RETURN",
            Self::ReferralBonus => "REFERRAL_BONUS",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
