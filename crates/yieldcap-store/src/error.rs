//! Error types for yieldcap storage.

use yieldcap_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The referral code does not belong to any account.
    #[error("invalid referral code: {0}")]
    InvalidReferralCode(String),

    /// An account with this email already exists.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Input rejected by ledger rules before any write.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}
