//! Transaction history handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use yieldcap_core::money::cents_to_units;
use yieldcap_core::{AccountId, Transaction, TransactionId, TransactionKind};
use yieldcap_store::Store;

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::handlers::accounts::load_account;
use crate::handlers::run_blocking;
use crate::state::AppState;

/// Largest page a caller may request.
const MAX_PAGE_SIZE: usize = 100;

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 10).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    10
}

/// Transaction response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction id.
    pub id: TransactionId,
    /// Owning account.
    pub account_id: AccountId,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount credited or deposited.
    pub amount: f64,
    /// Description.
    pub description: String,
    /// Timestamp.
    pub created_at: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            account_id: tx.account_id,
            kind: tx.kind,
            amount: cents_to_units(tx.amount_cents),
            description: tx.description.clone(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List the caller's transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(MAX_PAGE_SIZE);
    let transactions = run_blocking(move || {
        load_account(&state, auth.account_id)?;
        Ok(state
            .store
            .list_transactions_by_account(auth.account_id, limit + 1, query.offset)?)
    })
    .await?;

    let has_more = transactions.len() > limit;
    let transactions = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}
