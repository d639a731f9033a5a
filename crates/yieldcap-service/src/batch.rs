//! The daily return batch.
//!
//! One run walks every invested account and credits at most one capped daily return each.
//! Accounts are independent: a failure is logged and counted, and the run moves on.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use yieldcap_store::{DailyReturnOutcome, Store, StoreError};

/// Summary of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReturnReport {
    /// Accounts credited in this run.
    pub processed_count: usize,
    /// Accounts that already had a daily return today.
    pub skipped_already_credited: usize,
    /// Accounts at their earnings cap.
    pub skipped_at_cap: usize,
    /// Accounts whose credit failed.
    pub failed: usize,
}

/// Credit the daily return for every invested account.
///
/// Blocking; callers on the async runtime should use `spawn_blocking`.
///
/// # Errors
///
/// Returns an error only if the account population cannot be listed. Per-account
/// failures are counted in the report.
pub fn run_daily_returns<S: Store + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<DailyReturnReport, StoreError> {
    let started = Instant::now();
    let account_ids = store.list_invested_account_ids()?;
    let mut report = DailyReturnReport::default();

    for account_id in &account_ids {
        match store.credit_daily_return(*account_id, now) {
            Ok(DailyReturnOutcome::Credited {
                transaction,
                capped,
            }) => {
                report.processed_count += 1;
                tracing::debug!(
                    account_id = %account_id,
                    amount_cents = transaction.amount_cents,
                    capped,
                    "Daily return credited"
                );
            }
            Ok(DailyReturnOutcome::AlreadyCredited) => report.skipped_already_credited += 1,
            Ok(DailyReturnOutcome::AtCap) => report.skipped_at_cap += 1,
            Ok(DailyReturnOutcome::NotInvested) => {}
            Err(e) => {
                report.failed += 1;
                tracing::error!(account_id = %account_id, error = %e, "Daily return failed");
            }
        }
    }

    tracing::info!(
        eligible = account_ids.len(),
        processed = report.processed_count,
        already_credited = report.skipped_already_credited,
        at_cap = report.skipped_at_cap,
        failed = report.failed,
        elapsed_ms = started.elapsed().as_millis(),
        "Daily return run complete"
    );

    Ok(report)
}
