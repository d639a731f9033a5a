//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use yieldcap_core::{
    rules, Account, AccountId, NewAccount, ReferralCode, Transaction, TransactionId,
    TransactionKind, REFERRAL_BONUS_DEPOSIT_SLOTS,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::locks::AccountLocks;
use crate::schema::{all_column_families, cf};
use crate::{DailyReturnOutcome, DepositReceipt, JournalTotals, Store};

type Db = DBWithThreadMode<MultiThreaded>;

/// Attempts at drawing an unused referral code before giving up.
const MAX_REFERRAL_CODE_ATTEMPTS: usize = 32;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<Db>,
    locks: AccountLocks,
    registration: Mutex<()>,
    next_account_id: AtomicU64,
    next_transaction_id: AtomicU64,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// Id sequences resume after the highest persisted account and transaction ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = Db::open_cf_descriptors(&opts, path, cf_descriptors)?;

        let last_account = last_key(&db, cf::ACCOUNTS)?
            .and_then(|key| keys::decode_account_key(&key))
            .map_or(0, AccountId::get);
        let last_transaction = last_key(&db, cf::TRANSACTIONS)?
            .and_then(|key| keys::decode_transaction_key(&key))
            .map_or(0, TransactionId::get);

        tracing::debug!(last_account, last_transaction, "Ledger store opened");

        Ok(Self {
            db: Arc::new(db),
            locks: AccountLocks::new(),
            registration: Mutex::new(()),
            next_account_id: AtomicU64::new(last_account + 1),
            next_transaction_id: AtomicU64::new(last_transaction + 1),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn allocate_account_id(&self) -> AccountId {
        AccountId::new(self.next_account_id.fetch_add(1, Ordering::SeqCst))
    }

    fn allocate_transaction_id(&self) -> TransactionId {
        TransactionId::new(self.next_transaction_id.fetch_add(1, Ordering::SeqCst))
    }

    fn account_not_found(account_id: AccountId) -> StoreError {
        StoreError::NotFound {
            entity: "account",
            id: account_id.to_string(),
        }
    }

    fn decode_account_id(data: &[u8]) -> Result<AccountId> {
        keys::decode_account_key(data)
            .ok_or_else(|| StoreError::Serialization("malformed account id in index".into()))
    }

    fn find_account_id(&self, index: &str, key: &[u8]) -> Result<Option<AccountId>> {
        let cf = self.cf(index)?;
        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::decode_account_id(&data))
            .transpose()
    }

    fn find_account_id_by_email(&self, email: &str) -> Result<Option<AccountId>> {
        self.find_account_id(cf::ACCOUNTS_BY_EMAIL, &keys::email_key(email))
    }

    fn find_account_id_by_referral_code(&self, code: &ReferralCode) -> Result<Option<AccountId>> {
        self.find_account_id(cf::ACCOUNTS_BY_REFERRAL_CODE, &keys::referral_code_key(code))
    }

    /// Draw referral codes until one is unused. Caller holds the registration lock.
    fn unused_referral_code(&self) -> Result<ReferralCode> {
        for _ in 0..MAX_REFERRAL_CODE_ATTEMPTS {
            let code = ReferralCode::generate();
            if self.find_account_id_by_referral_code(&code)?.is_none() {
                return Ok(code);
            }
        }
        Err(StoreError::Database(
            "could not allocate an unused referral code".into(),
        ))
    }

    /// Stage an account row and its lookup indexes.
    fn stage_account(&self, batch: &mut WriteBatch, account: &Account) -> Result<()> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_by_email = self.cf(cf::ACCOUNTS_BY_EMAIL)?;
        let cf_by_code = self.cf(cf::ACCOUNTS_BY_REFERRAL_CODE)?;

        let account_key = keys::account_key(account.id);
        batch.put_cf(&cf_accounts, &account_key, Self::serialize(account)?);
        batch.put_cf(&cf_by_email, keys::email_key(&account.email), &account_key);
        batch.put_cf(
            &cf_by_code,
            keys::referral_code_key(&account.referral_code),
            &account_key,
        );

        if let Some(referrer_code) = &account.referred_by {
            let cf_referees = self.cf(cf::REFEREES_BY_CODE)?;
            batch.put_cf(&cf_referees, keys::referee_key(referrer_code, account.id), b"");
        }

        Ok(())
    }

    /// Stage a journal entry and its account index entry.
    fn stage_transaction(&self, batch: &mut WriteBatch, transaction: &Transaction) -> Result<()> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_by_account = self.cf(cf::TRANSACTIONS_BY_ACCOUNT)?;

        batch.put_cf(
            &cf_tx,
            keys::transaction_key(transaction.id),
            Self::serialize(transaction)?,
        );
        batch.put_cf(
            &cf_by_account,
            keys::account_transaction_key(transaction.account_id, transaction.id),
            b"",
        );

        Ok(())
    }

    /// Stage a capped referral bonus on the referrer. Caller holds the referrer's stripe.
    fn stage_referral_bonus(
        &self,
        batch: &mut WriteBatch,
        referrer_id: AccountId,
        referee: &Account,
        deposit_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>> {
        let Some(mut referrer) = self.get_account(referrer_id)? else {
            tracing::warn!(
                referrer_id = %referrer_id,
                referee_id = %referee.id,
                "Referrer vanished before bonus - skipping"
            );
            return Ok(None);
        };

        let credit = rules::referral_bonus(&referrer, deposit_cents);
        if credit.is_zero() {
            tracing::debug!(
                referrer_id = %referrer_id,
                nominal_cents = credit.nominal_cents,
                "Referrer at earnings cap - no bonus"
            );
            return Ok(None);
        }

        let bonus = Transaction::referral_bonus(
            self.allocate_transaction_id(),
            referrer_id,
            credit.actual_cents,
            &referee.name,
            now,
        );
        referrer.total_earned_cents += credit.actual_cents;
        referrer.updated_at = now;

        self.stage_transaction(batch, &bonus)?;
        self.stage_account(batch, &referrer)?;

        tracing::debug!(
            referrer_id = %referrer_id,
            referee_id = %referee.id,
            nominal_cents = credit.nominal_cents,
            actual_cents = credit.actual_cents,
            "Referral bonus staged"
        );

        Ok(Some(bonus))
    }

    /// Count an account's entries of `kind`, stopping once `at_most` have been seen.
    fn count_transactions_up_to(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        at_most: usize,
    ) -> Result<usize> {
        let mut count = 0;
        if at_most == 0 {
            return Ok(count);
        }

        self.scan_journal(account_id, |tx| {
            if tx.kind == kind {
                count += 1;
            }
            count < at_most
        })?;
        Ok(count)
    }

    /// Visit an account's journal newest first until `visit` returns `false`.
    fn scan_journal<F>(&self, account_id: AccountId, mut visit: F) -> Result<()>
    where
        F: FnMut(Transaction) -> bool,
    {
        let cf_by_account = self.cf(cf::TRANSACTIONS_BY_ACCOUNT)?;
        let prefix = keys::account_transactions_prefix(account_id);
        let upper = keys::account_transactions_upper_bound(account_id);

        let iter = self
            .db
            .iterator_cf(&cf_by_account, IteratorMode::From(&upper, Direction::Reverse));

        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }

            let tx_id = keys::extract_transaction_id_from_account_key(&key).ok_or_else(|| {
                StoreError::Serialization("malformed journal index key".into())
            })?;

            let transaction = self.get_transaction(tx_id)?.ok_or_else(|| StoreError::NotFound {
                entity: "transaction",
                id: tx_id.to_string(),
            })?;

            if !visit(transaction) {
                break;
            }
        }

        Ok(())
    }
}

/// Highest key in a column family, if any.
fn last_key(db: &Db, name: &str) -> Result<Option<Box<[u8]>>> {
    let cf = db
        .cf_handle(name)
        .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))?;

    let mut iter = db.iterator_cf(&cf, IteratorMode::End);
    match iter.next() {
        Some(item) => {
            let (key, _) = item?;
            Ok(Some(key))
        }
        None => Ok(None),
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn get_account(&self, account_id: AccountId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        match self.find_account_id_by_email(email)? {
            Some(account_id) => self.get_account(account_id),
            None => Ok(None),
        }
    }

    fn find_account_by_referral_code(&self, code: &ReferralCode) -> Result<Option<Account>> {
        match self.find_account_id_by_referral_code(code)? {
            Some(account_id) => self.get_account(account_id),
            None => Ok(None),
        }
    }

    fn has_accounts(&self) -> Result<bool> {
        Ok(last_key(&self.db, cf::ACCOUNTS)?.is_some())
    }

    fn list_referees(&self, code: &ReferralCode) -> Result<Vec<Account>> {
        let cf_referees = self.cf(cf::REFEREES_BY_CODE)?;
        let prefix = keys::referral_code_key(code);

        let iter = self
            .db
            .iterator_cf(&cf_referees, IteratorMode::From(&prefix, Direction::Forward));

        let mut referee_ids = Vec::new();
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            if let Some(account_id) = keys::extract_referee_id(&key) {
                referee_ids.push(account_id);
            }
        }

        // Ids are allocated in registration order.
        referee_ids.reverse();

        let mut referees = Vec::with_capacity(referee_ids.len());
        for account_id in referee_ids {
            if let Some(account) = self.get_account(account_id)? {
                referees.push(account);
            }
        }

        Ok(referees)
    }

    fn list_invested_account_ids(&self) -> Result<Vec<AccountId>> {
        let cf = self.cf(cf::ACCOUNTS)?;

        let mut ids = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            let account: Account = Self::deserialize(&value)?;
            if account.is_invested() {
                ids.push(account.id);
            }
        }

        Ok(ids)
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        let _locks = self.locks.lock(&[account.id]);

        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, account)?;
        self.db.write(batch)?;

        // Keep the sequence ahead of restored ids.
        self.next_account_id
            .fetch_max(account.id.get() + 1, Ordering::SeqCst);

        Ok(())
    }

    // =========================================================================
    // Journal Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_account(
        &self,
        account_id: AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        let mut skipped = 0;

        if limit == 0 {
            return Ok(transactions);
        }

        self.scan_journal(account_id, |tx| {
            if skipped < offset {
                skipped += 1;
                return true;
            }
            transactions.push(tx);
            transactions.len() < limit
        })?;

        Ok(transactions)
    }

    fn count_transactions(&self, account_id: AccountId, kind: TransactionKind) -> Result<usize> {
        self.count_transactions_up_to(account_id, kind, usize::MAX)
    }

    fn has_transaction_since(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        // Newest first: the newest entry of `kind` decides, and nothing past `since` can.
        let mut found = false;
        self.scan_journal(account_id, |tx| {
            if tx.kind == kind {
                found = tx.created_at >= since;
                return false;
            }
            tx.created_at >= since
        })?;
        Ok(found)
    }

    fn recompute_totals(&self, account_id: AccountId) -> Result<JournalTotals> {
        let mut totals = JournalTotals::default();
        self.scan_journal(account_id, |tx| {
            if tx.kind.is_earning() {
                totals.earned_cents += tx.amount_cents;
            } else {
                totals.invested_cents += tx.amount_cents;
            }
            true
        })?;
        Ok(totals)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn register_account(&self, input: NewAccount, now: DateTime<Utc>) -> Result<Account> {
        let _registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(code) = &input.referred_by {
            if self.find_account_id_by_referral_code(code)?.is_none() {
                return Err(StoreError::InvalidReferralCode(code.to_string()));
            }
        }

        if self.find_account_id_by_email(&input.email)?.is_some() {
            return Err(StoreError::EmailTaken(input.email));
        }

        let referral_code = self.unused_referral_code()?;
        let account = Account::new(self.allocate_account_id(), input, referral_code, now);

        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, &account)?;
        self.db.write(batch)?;

        tracing::debug!(
            account_id = %account.id,
            referral_code = %account.referral_code,
            referred_by = ?account.referred_by,
            "Account registered"
        );

        Ok(account)
    }

    fn process_deposit(
        &self,
        account_id: AccountId,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<DepositReceipt> {
        let amount_cents = rules::validate_deposit(amount_cents)?;

        // `referred_by` never changes, so the referrer can be resolved before locking.
        let referred_by = self
            .get_account(account_id)?
            .ok_or_else(|| Self::account_not_found(account_id))?
            .referred_by;
        let referrer_id = match &referred_by {
            Some(code) => {
                let referrer_id = self.find_account_id_by_referral_code(code)?;
                if referrer_id.is_none() {
                    tracing::warn!(
                        account_id = %account_id,
                        referred_by = %code,
                        "Referral code does not resolve to an account - no bonus"
                    );
                }
                referrer_id
            }
            None => None,
        };

        let mut lock_ids = vec![account_id];
        lock_ids.extend(referrer_id);
        let _locks = self.locks.lock(&lock_ids);

        let mut account = self
            .get_account(account_id)?
            .ok_or_else(|| Self::account_not_found(account_id))?;
        let prior_deposits = self.count_transactions_up_to(
            account_id,
            TransactionKind::Deposit,
            REFERRAL_BONUS_DEPOSIT_SLOTS,
        )?;

        let deposit =
            Transaction::deposit(self.allocate_transaction_id(), account_id, amount_cents, now);
        account.total_invested_cents += amount_cents;
        account.updated_at = now;

        let mut batch = WriteBatch::default();
        self.stage_transaction(&mut batch, &deposit)?;
        self.stage_account(&mut batch, &account)?;

        let referral_bonus = match referrer_id {
            Some(referrer_id)
                if referrer_id != account_id && rules::earns_referral_bonus(prior_deposits) =>
            {
                self.stage_referral_bonus(&mut batch, referrer_id, &account, amount_cents, now)?
            }
            _ => None,
        };

        self.db.write(batch)?;

        Ok(DepositReceipt {
            account,
            deposit,
            referral_bonus,
            prior_deposits,
        })
    }

    fn credit_daily_return(
        &self,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<DailyReturnOutcome> {
        let _locks = self.locks.lock(&[account_id]);

        let mut account = self
            .get_account(account_id)?
            .ok_or_else(|| Self::account_not_found(account_id))?;

        if !account.is_invested() {
            return Ok(DailyReturnOutcome::NotInvested);
        }

        let day_start = rules::start_of_local_day(now);
        if self.has_transaction_since(account_id, TransactionKind::DailyReturn, day_start)? {
            return Ok(DailyReturnOutcome::AlreadyCredited);
        }

        let credit = rules::daily_return(&account);
        if credit.is_zero() {
            return Ok(DailyReturnOutcome::AtCap);
        }

        let transaction = Transaction::daily_return(
            self.allocate_transaction_id(),
            account_id,
            credit.actual_cents,
            now,
        );
        account.total_earned_cents += credit.actual_cents;
        account.updated_at = now;

        let mut batch = WriteBatch::default();
        self.stage_transaction(&mut batch, &transaction)?;
        self.stage_account(&mut batch, &account)?;
        self.db.write(batch)?;

        Ok(DailyReturnOutcome::Credited {
            transaction,
            capped: credit.is_capped(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;
    use yieldcap_core::LedgerError;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    /// Noon local time on a fixed date, so day arithmetic never straddles midnight.
    fn noon(day: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 3, day, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn new_account(name: &str, referred_by: Option<&ReferralCode>) -> NewAccount {
        NewAccount {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".into(),
            referred_by: referred_by.cloned(),
        }
    }

    fn register_root(store: &RocksStore) -> Account {
        store
            .register_account(new_account("Root", None), noon(1))
            .unwrap()
    }

    fn assert_journal_matches(store: &RocksStore, account_id: AccountId) {
        let account = store.get_account(account_id).unwrap().unwrap();
        let totals = store.recompute_totals(account_id).unwrap();
        assert_eq!(totals.invested_cents, account.total_invested_cents);
        assert_eq!(totals.earned_cents, account.total_earned_cents);
        assert!(account.total_earned_cents <= account.total_invested_cents * 3);
    }

    #[test]
    fn register_and_lookup() {
        let (store, _dir) = create_test_store();
        assert!(!store.has_accounts().unwrap());

        let root = register_root(&store);
        assert_eq!(root.id, AccountId::new(1));
        assert!(store.has_accounts().unwrap());

        let by_email = store.find_account_by_email("root@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, root.id);

        let by_code = store
            .find_account_by_referral_code(&root.referral_code)
            .unwrap()
            .unwrap();
        assert_eq!(by_code.id, root.id);
    }

    #[test]
    fn register_rejects_unknown_referral_code() {
        let (store, _dir) = create_test_store();
        register_root(&store);

        let bogus: ReferralCode = "ZZZZZZ".parse().unwrap();
        let result = store.register_account(new_account("Ada", Some(&bogus)), noon(1));
        assert!(matches!(result, Err(StoreError::InvalidReferralCode(_))));
        assert!(store.find_account_by_email("ada@example.com").unwrap().is_none());
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);

        store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();
        let result = store.register_account(new_account("Ada", Some(&root.referral_code)), noon(1));
        assert!(matches!(result, Err(StoreError::EmailTaken(_))));
    }

    #[test]
    fn referees_listed_newest_first() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);

        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();
        let bob = store
            .register_account(new_account("Bob", Some(&root.referral_code)), noon(2))
            .unwrap();
        store
            .register_account(new_account("Cy", Some(&ada.referral_code)), noon(2))
            .unwrap();

        let referees = store.list_referees(&root.referral_code).unwrap();
        let ids: Vec<_> = referees.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![bob.id, ada.id]);
    }

    #[test]
    fn sequences_resume_after_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            let root = register_root(&store);
            store.process_deposit(root.id, 10_000, noon(1)).unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let root = store.find_account_by_email("root@example.com").unwrap().unwrap();
        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(2))
            .unwrap();
        assert_eq!(ada.id, AccountId::new(2));

        let receipt = store.process_deposit(ada.id, 10_000, noon(2)).unwrap();
        assert!(receipt.deposit.id > TransactionId::new(1));
        assert_journal_matches(&store, root.id);
    }

    #[test]
    fn deposit_below_minimum_changes_nothing() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);

        let result = store.process_deposit(root.id, 5_000, noon(1));
        assert!(matches!(
            result,
            Err(StoreError::Ledger(LedgerError::DepositBelowMinimum { .. }))
        ));

        let account = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(account.total_invested_cents, 0);
        assert!(store
            .list_transactions_by_account(root.id, 10, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn deposit_for_missing_account_is_not_found() {
        let (store, _dir) = create_test_store();
        let result = store.process_deposit(AccountId::new(42), 10_000, noon(1));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn first_deposit_pays_referrer_five_percent() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        store.process_deposit(root.id, 100_000, noon(1)).unwrap();

        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();
        let receipt = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();

        assert_eq!(receipt.prior_deposits, 0);
        let bonus = receipt.referral_bonus.unwrap();
        assert_eq!(bonus.account_id, root.id);
        assert_eq!(bonus.amount_cents, 1_000);
        assert_eq!(bonus.kind, TransactionKind::ReferralBonus);
        assert_eq!(bonus.description, "Bonus from Ada deposit");

        let root = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(root.total_earned_cents, 1_000);
        assert_journal_matches(&store, root.id);
        assert_journal_matches(&store, ada.id);
    }

    #[test]
    fn third_deposit_never_pays_bonus() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        store.process_deposit(root.id, 1_000_000, noon(1)).unwrap();

        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();

        let first = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();
        let second = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();
        let third = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();

        assert!(first.referral_bonus.is_some());
        assert!(second.referral_bonus.is_some());
        assert!(third.referral_bonus.is_none());
        assert_eq!(third.prior_deposits, 2);

        let root = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(root.total_earned_cents, 2_000);
        assert_eq!(
            store
                .count_transactions(root.id, TransactionKind::ReferralBonus)
                .unwrap(),
            2
        );
    }

    #[test]
    fn prior_deposit_count_saturates_at_bonus_slots() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);

        for _ in 0..3 {
            store.process_deposit(root.id, 10_000, noon(1)).unwrap();
        }
        let fourth = store.process_deposit(root.id, 10_000, noon(1)).unwrap();

        assert_eq!(fourth.prior_deposits, REFERRAL_BONUS_DEPOSIT_SLOTS);
        assert_eq!(
            store.count_transactions(root.id, TransactionKind::Deposit).unwrap(),
            4
        );
    }

    #[test]
    fn unresolvable_referral_code_skips_bonus() {
        let (store, _dir) = create_test_store();
        let mut root = register_root(&store);
        root.referred_by = Some("QQQQQQ".parse().unwrap());
        store.put_account(&root).unwrap();

        let receipt = store.process_deposit(root.id, 20_000, noon(1)).unwrap();

        assert!(receipt.referral_bonus.is_none());
        assert_eq!(receipt.account.total_invested_cents, 20_000);
        assert_journal_matches(&store, root.id);
    }

    #[test]
    fn referrer_without_investment_gets_no_bonus() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();

        let receipt = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();
        assert!(receipt.referral_bonus.is_none());

        let root = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(root.total_earned_cents, 0);
        assert_eq!(
            store.count_transactions(root.id, TransactionKind::ReferralBonus).unwrap(),
            0
        );
    }

    #[test]
    fn referral_bonus_is_clamped_to_referrer_cap() {
        let (store, _dir) = create_test_store();
        let mut root = register_root(&store);
        root.total_invested_cents = 100_000;
        root.total_earned_cents = 299_500;
        store.put_account(&root).unwrap();

        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();
        let receipt = store.process_deposit(ada.id, 20_000, noon(1)).unwrap();

        assert_eq!(receipt.referral_bonus.unwrap().amount_cents, 500);
        let root = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(root.total_earned_cents, 300_000);
    }

    #[test]
    fn daily_return_credits_once_per_day() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        store.process_deposit(root.id, 100_000, noon(1)).unwrap();

        let first = store.credit_daily_return(root.id, noon(2)).unwrap();
        match first {
            DailyReturnOutcome::Credited { transaction, capped } => {
                assert_eq!(transaction.amount_cents, 600);
                assert!(!capped);
            }
            other => panic!("expected credit, got {other:?}"),
        }

        let again = store
            .credit_daily_return(root.id, noon(2) + Duration::hours(3))
            .unwrap();
        assert!(matches!(again, DailyReturnOutcome::AlreadyCredited));

        let next_day = store.credit_daily_return(root.id, noon(3)).unwrap();
        assert!(matches!(next_day, DailyReturnOutcome::Credited { .. }));

        let account = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(account.total_earned_cents, 1_200);
        assert_journal_matches(&store, root.id);
    }

    #[test]
    fn same_day_check_looks_at_newest_daily_return_only() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        store.process_deposit(root.id, 100_000, noon(1)).unwrap();
        store.credit_daily_return(root.id, noon(2)).unwrap();
        store.process_deposit(root.id, 10_000, noon(3)).unwrap();

        let today = rules::start_of_local_day(noon(3));
        assert!(!store
            .has_transaction_since(root.id, TransactionKind::DailyReturn, today)
            .unwrap());

        let yesterday = rules::start_of_local_day(noon(2));
        assert!(store
            .has_transaction_since(root.id, TransactionKind::DailyReturn, yesterday)
            .unwrap());

        let outcome = store.credit_daily_return(root.id, noon(3)).unwrap();
        assert!(matches!(outcome, DailyReturnOutcome::Credited { .. }));
    }

    #[test]
    fn daily_return_partial_credit_reaches_cap_exactly() {
        let (store, _dir) = create_test_store();
        let mut root = register_root(&store);
        root.total_invested_cents = 100_000;
        root.total_earned_cents = 299_700;
        store.put_account(&root).unwrap();

        let outcome = store.credit_daily_return(root.id, noon(2)).unwrap();
        match outcome {
            DailyReturnOutcome::Credited { transaction, capped } => {
                assert_eq!(transaction.amount_cents, 300);
                assert!(capped);
            }
            other => panic!("expected credit, got {other:?}"),
        }
        let account = store.get_account(root.id).unwrap().unwrap();
        assert_eq!(account.total_earned_cents, 300_000);

        let again = store.credit_daily_return(root.id, noon(2)).unwrap();
        assert!(matches!(again, DailyReturnOutcome::AlreadyCredited));

        let next_day = store.credit_daily_return(root.id, noon(3)).unwrap();
        assert!(matches!(next_day, DailyReturnOutcome::AtCap));
        assert_eq!(
            store.count_transactions(root.id, TransactionKind::DailyReturn).unwrap(),
            1
        );
    }

    #[test]
    fn daily_return_zero_at_cap_writes_nothing() {
        let (store, _dir) = create_test_store();
        let mut root = register_root(&store);
        root.total_invested_cents = 100_000;
        root.total_earned_cents = 300_000;
        store.put_account(&root).unwrap();

        let outcome = store.credit_daily_return(root.id, noon(2)).unwrap();
        assert!(matches!(outcome, DailyReturnOutcome::AtCap));
        assert!(store
            .list_transactions_by_account(root.id, 10, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn daily_return_skips_uninvested() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        let outcome = store.credit_daily_return(root.id, noon(2)).unwrap();
        assert!(matches!(outcome, DailyReturnOutcome::NotInvested));
        assert!(store.list_invested_account_ids().unwrap().is_empty());
    }

    #[test]
    fn journal_lists_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let root = register_root(&store);
        store.process_deposit(root.id, 10_000, noon(1)).unwrap();
        store.process_deposit(root.id, 20_000, noon(1)).unwrap();
        store.credit_daily_return(root.id, noon(2)).unwrap();

        let all = store.list_transactions_by_account(root.id, 10, 0).unwrap();
        let kinds: Vec<_> = all.iter().map(|tx| tx.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::DailyReturn,
                TransactionKind::Deposit,
                TransactionKind::Deposit
            ]
        );

        let page = store.list_transactions_by_account(root.id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount_cents, 20_000);
    }

    #[test]
    fn concurrent_deposits_pay_at_most_two_bonuses() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let root = register_root(&store);
        store.process_deposit(root.id, 10_000_000, noon(1)).unwrap();
        let ada = store
            .register_account(new_account("Ada", Some(&root.referral_code)), noon(1))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.process_deposit(ada.id, 10_000, noon(1)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            store.count_transactions(ada.id, TransactionKind::Deposit).unwrap(),
            8
        );
        assert_eq!(
            store
                .count_transactions(root.id, TransactionKind::ReferralBonus)
                .unwrap(),
            2
        );
        assert_journal_matches(&store, ada.id);
        assert_journal_matches(&store, root.id);
    }
}
