//! Account types for yieldcap.
//!
//! An account carries identity, credentials, its referral linkage, and the two aggregate
//! totals that cache the sums of its journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cap;
use crate::error::{LedgerError, Result};
use crate::{AccountId, ReferralCode};

/// A registered investor account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Sequential account id.
    pub id: AccountId,

    /// Display name.
    pub name: String,

    /// Login email, trimmed and lower-cased.
    pub email: String,

    /// Argon2 PHC string of the password.
    pub password_hash: String,

    /// This account's own referral code.
    pub referral_code: ReferralCode,

    /// Referral code of the account that referred this one.
    pub referred_by: Option<ReferralCode>,

    /// Sum of all deposits, in cents.
    pub total_invested_cents: i64,

    /// Sum of all daily returns and referral bonuses, in cents.
    pub total_earned_cents: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Registration input, validated and hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Normalized email (see [`normalize_email`]).
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Referral code of the referrer; `None` only for the root account.
    pub referred_by: Option<ReferralCode>,
}

impl Account {
    /// Create a new account with zero totals.
    #[must_use]
    pub fn new(
        id: AccountId,
        input: NewAccount,
        referral_code: ReferralCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            referral_code,
            referred_by: input.referred_by,
            total_invested_cents: 0,
            total_earned_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Maximum lifetime earnings for this account.
    #[must_use]
    pub const fn earnings_cap_cents(&self) -> i64 {
        cap::earnings_cap(self.total_invested_cents)
    }

    /// How much more this account may earn.
    #[must_use]
    pub fn remaining_capacity_cents(&self) -> i64 {
        cap::remaining_capacity(self.total_invested_cents, self.total_earned_cents)
    }

    /// Whether the account has ever deposited.
    #[must_use]
    pub const fn is_invested(&self) -> bool {
        self.total_invested_cents > 0
    }
}

/// Trim and lower-case an email, rejecting obviously malformed input.
///
/// # Errors
///
/// Returns `LedgerError::InvalidEmail` when there is no `local@domain` shape.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(LedgerError::InvalidEmail(raw.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::new(
            AccountId::new(1),
            NewAccount {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
                referred_by: None,
            },
            ReferralCode::generate(),
            Utc::now(),
        )
    }

    #[test]
    fn new_account_has_zero_totals() {
        let account = sample();
        assert_eq!(account.total_invested_cents, 0);
        assert_eq!(account.total_earned_cents, 0);
        assert!(!account.is_invested());
        assert_eq!(account.remaining_capacity_cents(), 0);
    }

    #[test]
    fn remaining_capacity_tracks_totals() {
        let mut account = sample();
        account.total_invested_cents = 100_000;
        account.total_earned_cents = 299_000;
        assert_eq!(account.earnings_cap_cents(), 300_000);
        assert_eq!(account.remaining_capacity_cents(), 1_000);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ada@").is_err());
        assert!(normalize_email("a@b@c").is_err());
        assert!(normalize_email("a da@example.com").is_err());
    }
}
