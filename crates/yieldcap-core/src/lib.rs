//! Core types and ledger rules for yieldcap.
//!
//! This crate provides the foundational types used throughout the yieldcap platform:
//!
//! - **Identifiers**: `AccountId`, `TransactionId`, `ReferralCode`
//! - **Accounts**: `Account`, `NewAccount`
//! - **Journal**: `Transaction`, `TransactionKind`
//! - **Cap Calculator**: `remaining_capacity`, `clamp_credit`
//! - **Rules**: daily yield, referral bonus, deposit limits
//!
//! # Money Unit
//!
//! All amounts are stored as `i64` integer cents (2-place precision).
//!
//! - User deposits 250.00 → `25_000` cents
//! - Daily yield of 0.6% on 1000.00 → `600` cents
//! - Amounts are only converted to decimals at the API boundary

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod cap;
pub mod error;
pub mod ids;
pub mod money;
pub mod rules;
pub mod transaction;

pub use account::{normalize_email, Account, NewAccount};
pub use cap::{clamp_credit, earnings_cap, remaining_capacity, EARNINGS_CAP_MULTIPLE};
pub use error::{LedgerError, Result};
pub use ids::{AccountId, IdError, ReferralCode, TransactionId, REFERRAL_CODE_LEN};
pub use rules::{
    daily_return, earns_referral_bonus, referral_bonus, start_of_local_day, validate_deposit,
    Credit, DAILY_RETURN_BPS, MAX_DEPOSIT_CENTS, MIN_DEPOSIT_CENTS, REFERRAL_BONUS_BPS,
    REFERRAL_BONUS_DEPOSIT_SLOTS,
};
pub use transaction::{Transaction, TransactionKind};
