//! Operator handlers: the daily return batch and the ledger audit.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use yieldcap_core::money::cents_to_units;
use yieldcap_core::AccountId;
use yieldcap_store::Store;

use crate::auth::AdminAuth;
use crate::batch::{self, DailyReturnReport};
use crate::error::ApiError;
use crate::handlers::accounts::load_account;
use crate::handlers::run_blocking;
use crate::state::AppState;

/// Run the daily return batch for today.
pub async fn run_daily_returns(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
) -> Result<Json<DailyReturnReport>, ApiError> {
    tracing::info!(admin_id = %admin.admin_id, "Daily return run requested");

    let store = Arc::clone(&state.store);
    let report =
        run_blocking(move || Ok(batch::run_daily_returns(store.as_ref(), Utc::now())?)).await?;

    Ok(Json(report))
}

/// Cached totals next to the totals rebuilt from the journal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    /// Audited account.
    pub account_id: AccountId,
    /// `totalInvested` as stored on the account.
    pub cached_invested: f64,
    /// Sum of deposit entries.
    pub journal_invested: f64,
    /// `totalEarned` as stored on the account.
    pub cached_earned: f64,
    /// Sum of earning entries.
    pub journal_earned: f64,
    /// Both pairs agree.
    pub consistent: bool,
}

/// Compare an account's cached totals with its journal.
pub async fn audit_account(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(account_id): Path<String>,
) -> Result<Json<AuditResponse>, ApiError> {
    let account_id: AccountId = account_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid account id: {account_id}")))?;

    let account = load_account(&state, account_id)?;
    let journal = state.store.recompute_totals(account_id)?;

    let consistent = journal.invested_cents == account.total_invested_cents
        && journal.earned_cents == account.total_earned_cents;

    if consistent {
        tracing::debug!(admin_id = %admin.admin_id, account_id = %account_id, "Audit passed");
    } else {
        tracing::warn!(
            admin_id = %admin.admin_id,
            account_id = %account_id,
            cached_invested = account.total_invested_cents,
            journal_invested = journal.invested_cents,
            cached_earned = account.total_earned_cents,
            journal_earned = journal.earned_cents,
            "Cached totals disagree with journal"
        );
    }

    Ok(Json(AuditResponse {
        account_id,
        cached_invested: cents_to_units(account.total_invested_cents),
        journal_invested: cents_to_units(journal.invested_cents),
        cached_earned: cents_to_units(account.total_earned_cents),
        journal_earned: cents_to_units(journal.earned_cents),
        consistent,
    }))
}
