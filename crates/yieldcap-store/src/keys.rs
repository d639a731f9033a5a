//! Key encoding utilities for `RocksDB`.
//!
//! Ids are encoded big-endian so that lexicographic key order is numeric order.

use yieldcap_core::{AccountId, ReferralCode, TransactionId, REFERRAL_CODE_LEN};

const ID_LEN: usize = 8;

/// Create an account key from an account id.
#[must_use]
pub fn account_key(account_id: AccountId) -> Vec<u8> {
    account_id.to_be_bytes().to_vec()
}

/// Decode an account id from an account key.
#[must_use]
pub fn decode_account_key(key: &[u8]) -> Option<AccountId> {
    read_id(key, 0).map(AccountId::from_be_bytes)
}

/// Create a transaction key from a transaction id.
#[must_use]
pub fn transaction_key(transaction_id: TransactionId) -> Vec<u8> {
    transaction_id.to_be_bytes().to_vec()
}

/// Decode a transaction id from a transaction key.
#[must_use]
pub fn decode_transaction_key(key: &[u8]) -> Option<TransactionId> {
    read_id(key, 0).map(TransactionId::from_be_bytes)
}

/// Create an account-transaction index key.
///
/// Format: `account_id (8 bytes) || transaction_id (8 bytes)`
#[must_use]
pub fn account_transaction_key(account_id: AccountId, transaction_id: TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LEN * 2);
    key.extend_from_slice(&account_id.to_be_bytes());
    key.extend_from_slice(&transaction_id.to_be_bytes());
    key
}

/// Create a prefix for iterating all transactions of an account.
#[must_use]
pub fn account_transactions_prefix(account_id: AccountId) -> Vec<u8> {
    account_id.to_be_bytes().to_vec()
}

/// Largest possible index key for an account; the start point for newest-first scans.
#[must_use]
pub fn account_transactions_upper_bound(account_id: AccountId) -> Vec<u8> {
    account_transaction_key(account_id, TransactionId::new(u64::MAX))
}

/// Extract the transaction id from an account-transaction index key.
#[must_use]
pub fn extract_transaction_id_from_account_key(key: &[u8]) -> Option<TransactionId> {
    read_id(key, ID_LEN).map(TransactionId::from_be_bytes)
}

/// Create an email index key.
#[must_use]
pub fn email_key(email: &str) -> Vec<u8> {
    email.as_bytes().to_vec()
}

/// Create a referral code index key.
#[must_use]
pub fn referral_code_key(code: &ReferralCode) -> Vec<u8> {
    code.as_bytes().to_vec()
}

/// Create a referee index key.
///
/// Format: `referral_code (6 bytes) || account_id (8 bytes)`
#[must_use]
pub fn referee_key(code: &ReferralCode, referee_id: AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(REFERRAL_CODE_LEN + ID_LEN);
    key.extend_from_slice(code.as_bytes());
    key.extend_from_slice(&referee_id.to_be_bytes());
    key
}

/// Extract the referee id from a referee index key.
#[must_use]
pub fn extract_referee_id(key: &[u8]) -> Option<AccountId> {
    read_id(key, REFERRAL_CODE_LEN).map(AccountId::from_be_bytes)
}

fn read_id(key: &[u8], offset: usize) -> Option<[u8; ID_LEN]> {
    key.get(offset..offset + ID_LEN)?.try_into().ok()
}
