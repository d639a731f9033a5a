//! Account view handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use yieldcap_core::money::cents_to_units;
use yieldcap_core::{Account, AccountId};
use yieldcap_store::Store;

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// This account's referral code.
    pub referral_code: String,
    /// Code of the referring account.
    pub referred_by: Option<String>,
    /// Sum of deposits.
    pub total_invested: f64,
    /// Sum of daily returns and referral bonuses.
    pub total_earned: f64,
    /// Lifetime earnings ceiling (3x invested).
    pub earnings_cap: f64,
    /// How much more the account may earn.
    pub remaining_cap: f64,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            referral_code: account.referral_code.to_string(),
            referred_by: account.referred_by.as_ref().map(ToString::to_string),
            total_invested: cents_to_units(account.total_invested_cents),
            total_earned: cents_to_units(account.total_earned_cents),
            earnings_cap: cents_to_units(account.earnings_cap_cents()),
            remaining_cap: cents_to_units(account.remaining_capacity_cents()),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Load the caller's account or fail with `NotFound`.
pub(crate) fn load_account(state: &AppState, account_id: AccountId) -> Result<Account, ApiError> {
    state
        .store
        .get_account(account_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))
}

/// Get the current account with its remaining cap.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = load_account(&state, auth.account_id)?;
    Ok(Json(AccountResponse::from(&account)))
}

/// A referred account as shown to its referrer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralResponse {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Sum of the referee's deposits.
    pub total_invested: f64,
    /// Registration timestamp.
    pub created_at: String,
}

impl From<&Account> for ReferralResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            total_invested: cents_to_units(account.total_invested_cents),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// List the accounts the caller referred, newest first.
pub async fn list_referrals(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
) -> Result<Json<Vec<ReferralResponse>>, ApiError> {
    let account = load_account(&state, auth.account_id)?;
    let referees = state.store.list_referees(&account.referral_code)?;

    Ok(Json(referees.iter().map(ReferralResponse::from).collect()))
}
