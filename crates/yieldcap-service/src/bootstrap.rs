//! Root account creation on an empty ledger.
//!
//! Registration needs an existing referral code, so the first account has to come from
//! configuration.

use chrono::{DateTime, Utc};

use yieldcap_core::{normalize_email, Account, NewAccount};
use yieldcap_store::Store;

use crate::config::BootstrapConfig;
use crate::crypto::hash_password;
use crate::error::ApiError;

/// Create the root account if the store holds no accounts.
///
/// Returns the new account, or `None` when the ledger was already populated.
///
/// # Errors
///
/// Returns an error if the configured email is malformed or the write fails.
pub fn bootstrap_root<S: Store + ?Sized>(
    store: &S,
    config: &BootstrapConfig,
    now: DateTime<Utc>,
) -> Result<Option<Account>, ApiError> {
    if store.has_accounts()? {
        tracing::debug!("Ledger already has accounts - skipping bootstrap");
        return Ok(None);
    }

    let email = normalize_email(&config.email)?;
    let password_hash = hash_password(&config.password)?;

    let root = store.register_account(
        NewAccount {
            name: config.name.clone(),
            email,
            password_hash,
            referred_by: None,
        },
        now,
    )?;

    tracing::info!(
        account_id = %root.id,
        email = %root.email,
        referral_code = %root.referral_code,
        "Root account created"
    );

    Ok(Some(root))
}
