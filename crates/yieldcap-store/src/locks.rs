//! Per-account write serialization.
//!
//! Every read-modify-write of an account's totals happens while holding that account's
//! stripe. Multi-account operations take their stripes in ascending order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use yieldcap_core::AccountId;

const STRIPES: usize = 64;

/// A fixed table of lock stripes indexed by account id.
pub struct AccountLocks {
    stripes: Vec<Mutex<()>>,
}

/// Guards held for the duration of one compound write.
pub struct LockSet<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl AccountLocks {
    /// Create the lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stripes: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Lock every stripe covering `accounts`, deduplicated and in ascending order.
    pub fn lock(&self, accounts: &[AccountId]) -> LockSet<'_> {
        let mut indexes: Vec<usize> = accounts.iter().map(|id| Self::stripe(*id)).collect();
        indexes.sort_unstable();
        indexes.dedup();

        // The guarded value is `()`, so a poisoned stripe carries no broken state.
        let guards = indexes
            .into_iter()
            .map(|idx| {
                self.stripes[idx]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
            })
            .collect();

        LockSet { _guards: guards }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stripe(account_id: AccountId) -> usize {
        (account_id.get() % STRIPES as u64) as usize
    }
}

impl Default for AccountLocks {
    fn default() -> Self {
        Self::new()
    }
}
