//! Error types for yieldcap ledger rules.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by ledger validation before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Deposit is below the minimum.
    #[error("minimum deposit not met: amount={amount_cents}, minimum={minimum_cents}")]
    DepositBelowMinimum {
        /// Requested amount in cents.
        amount_cents: i64,
        /// Minimum accepted amount in cents.
        minimum_cents: i64,
    },

    /// Deposit is above the largest storable amount.
    #[error("deposit exceeds maximum: amount={amount_cents}, maximum={maximum_cents}")]
    DepositAboveMaximum {
        /// Requested amount in cents.
        amount_cents: i64,
        /// Maximum accepted amount in cents.
        maximum_cents: i64,
    },

    /// The amount is not a finite, non-negative number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Referral code is malformed.
    #[error("invalid referral code: {0}")]
    InvalidReferralCode(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
