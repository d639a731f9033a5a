//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by `account_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Index: email → `account_id`.
    pub const ACCOUNTS_BY_EMAIL: &str = "accounts_by_email";

    /// Index: referral code → `account_id`.
    pub const ACCOUNTS_BY_REFERRAL_CODE: &str = "accounts_by_referral_code";

    /// Index: referees of a code, keyed by `referral_code || account_id`.
    /// Value is empty (index only).
    pub const REFEREES_BY_CODE: &str = "referees_by_code";

    /// Journal entries, keyed by `transaction_id`.
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: journal entries by account, keyed by `account_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_ACCOUNT: &str = "transactions_by_account";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::ACCOUNTS_BY_EMAIL,
        cf::ACCOUNTS_BY_REFERRAL_CODE,
        cf::REFEREES_BY_CODE,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_ACCOUNT,
    ]
}
