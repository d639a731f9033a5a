//! Deposit handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use yieldcap_core::money::{cents_to_units, parse_amount};
use yieldcap_core::TransactionId;
use yieldcap_store::Store;

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::run_blocking;
use crate::state::AppState;

/// Deposit request. `amount` may be a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Amount in currency units.
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
}

/// Deposit acknowledgment. Balances are re-fetched through `GET /account`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    /// Confirmation message.
    pub message: String,
    /// Journal entry of the deposit.
    pub transaction_id: TransactionId,
    /// Recorded amount.
    pub amount: f64,
}

/// Record a deposit for the caller.
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    ApiJson(req): ApiJson<DepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let amount = req
        .amount
        .ok_or_else(|| ApiError::BadRequest("Amount is required".into()))?;
    let amount_cents = parse_amount(&amount)?;

    let store = Arc::clone(&state.store);
    let account_id = auth.account_id;
    let receipt = run_blocking(move || {
        Ok(store.process_deposit(account_id, amount_cents, Utc::now())?)
    })
    .await?;

    tracing::info!(
        account_id = %auth.account_id,
        amount_cents,
        prior_deposits = receipt.prior_deposits,
        referral_bonus_cents = ?receipt.referral_bonus.as_ref().map(|tx| tx.amount_cents),
        "Deposit processed"
    );

    Ok(Json(DepositResponse {
        message: "Deposit successful".into(),
        transaction_id: receipt.deposit.id,
        amount: cents_to_units(receipt.deposit.amount_cents),
    }))
}
