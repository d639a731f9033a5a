//! `RocksDB` storage layer for yieldcap.
//!
//! This crate holds the account ledger and the append-only transaction journal, and runs the
//! ledger's compound writes (registration, deposit, daily-return credit) atomically.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Primary account records, keyed by `account_id`
//! - `accounts_by_email`, `accounts_by_referral_code`: Unique lookup indexes
//! - `referees_by_code`: Index for listing the accounts a code referred
//! - `transactions`: Journal entries, keyed by `transaction_id`
//! - `transactions_by_account`: Index for listing an account's journal
//!
//! Compound operations stage every row in one `WriteBatch` while holding the lock stripes of
//! the accounts they touch, so totals and journal either change together or not at all.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use yieldcap_core::NewAccount;
//! use yieldcap_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/yieldcap-db").unwrap();
//!
//! let root = store
//!     .register_account(
//!         NewAccount {
//!             name: "Root".into(),
//!             email: "root@example.com".into(),
//!             password_hash: "<argon2 hash>".into(),
//!             referred_by: None,
//!         },
//!         Utc::now(),
//!     )
//!     .unwrap();
//!
//! store.process_deposit(root.id, 25_000, Utc::now()).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod locks;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use yieldcap_core::{
    Account, AccountId, NewAccount, ReferralCode, Transaction, TransactionId, TransactionKind,
};

/// Totals rebuilt from the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JournalTotals {
    /// Sum of deposit entries.
    pub invested_cents: i64,
    /// Sum of daily return and referral bonus entries.
    pub earned_cents: i64,
}

/// Result of a committed deposit.
#[derive(Debug, Clone)]
pub struct DepositReceipt {
    /// The depositor after the deposit.
    pub account: Account,
    /// The deposit journal entry.
    pub deposit: Transaction,
    /// Bonus credited to the referrer, if any.
    pub referral_bonus: Option<Transaction>,
    /// Deposits the account had made before this one, saturating at
    /// [`yieldcap_core::REFERRAL_BONUS_DEPOSIT_SLOTS`].
    pub prior_deposits: usize,
}

/// What happened to one account in a daily-return run.
#[derive(Debug, Clone)]
pub enum DailyReturnOutcome {
    /// A daily return was written.
    Credited {
        /// The journal entry.
        transaction: Transaction,
        /// The credit was cut short by the earnings cap.
        capped: bool,
    },
    /// A daily return already exists for the current day.
    AlreadyCredited,
    /// The account has reached its earnings cap.
    AtCap,
    /// The account has never deposited.
    NotInvested,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, account_id: AccountId) -> Result<Option<Account>>;

    /// Find an account by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Find an account by its referral code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_account_by_referral_code(&self, code: &ReferralCode) -> Result<Option<Account>>;

    /// Whether any account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_accounts(&self) -> Result<bool>;

    /// Accounts referred by `code`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_referees(&self, code: &ReferralCode) -> Result<Vec<Account>>;

    /// Ids of every account with a positive invested total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_invested_account_ids(&self) -> Result<Vec<AccountId>>;

    /// Write an account record as-is, including its lookup indexes.
    ///
    /// Intended for restores and fixtures; ledger mutations go through the compound
    /// operations below. Email and referral code must not differ from a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    // =========================================================================
    // Journal Operations
    // =========================================================================

    /// Get a journal entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Option<Transaction>>;

    /// List an account's journal, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_account(
        &self,
        account_id: AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>>;

    /// Count an account's journal entries of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count_transactions(&self, account_id: AccountId, kind: TransactionKind) -> Result<usize>;

    /// Whether the account has an entry of `kind` created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_transaction_since(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        since: DateTime<Utc>,
    ) -> Result<bool>;

    /// Rebuild an account's totals from its journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn recompute_totals(&self, account_id: AccountId) -> Result<JournalTotals>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Register an account with a freshly generated referral code.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidReferralCode` if `referred_by` names no account.
    /// - `StoreError::EmailTaken` if the email is already registered.
    fn register_account(&self, input: NewAccount, now: DateTime<Utc>) -> Result<Account>;

    /// Record a deposit, raise the invested total, and pay any referral bonus atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::Ledger` if the amount is outside deposit limits.
    /// - `StoreError::NotFound` if the account doesn't exist.
    fn process_deposit(
        &self,
        account_id: AccountId,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<DepositReceipt>;

    /// Credit one account's capped daily return for the calendar day containing `now`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    fn credit_daily_return(
        &self,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<DailyReturnOutcome>;
}
