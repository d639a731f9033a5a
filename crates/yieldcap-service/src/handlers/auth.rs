//! Registration and login handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use yieldcap_core::{normalize_email, NewAccount, ReferralCode};
use yieldcap_store::Store;

use crate::auth::issue_token;
use crate::crypto::{hash_password, verify_password};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::accounts::AccountResponse;
use crate::handlers::run_blocking;
use crate::state::AppState;

/// Shortest accepted password.
const MIN_PASSWORD_LEN: usize = 6;

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plain password.
    #[serde(default)]
    pub password: Option<String>,
    /// Code of the referring account.
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plain password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// The authenticated account.
    pub account: AccountResponse,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Register an account under an existing referral code.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(req.name),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Please enter all fields".into()));
    };

    let referral_code = non_blank(req.referral_code)
        .ok_or_else(|| ApiError::BadRequest("Referral code is required".into()))?;

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let email = normalize_email(&email)?;
    let referred_by: ReferralCode = referral_code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid referral code".into()))?;

    let now = Utc::now();
    let store = Arc::clone(&state.store);
    let account = run_blocking(move || {
        let password_hash = hash_password(&password)?;
        Ok(store.register_account(
            NewAccount {
                name,
                email,
                password_hash,
                referred_by: Some(referred_by),
            },
            now,
        )?)
    })
    .await?;

    tracing::info!(
        account_id = %account.id,
        referred_by = ?account.referred_by,
        "Account registered"
    );

    let token = issue_token(&state, account.id, now)?;

    Ok(Json(AuthResponse {
        token,
        account: AccountResponse::from(&account),
    }))
}

/// Exchange email and password for a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(ApiError::BadRequest("Please enter all fields".into()));
    };

    let email = normalize_email(&email).map_err(|_| ApiError::InvalidCredentials)?;

    let store = Arc::clone(&state.store);
    let account = run_blocking(move || {
        let Some(account) = store.find_account_by_email(&email)? else {
            tracing::debug!("Login for unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(&password, &account.password_hash) {
            tracing::debug!(account_id = %account.id, "Login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        Ok(account)
    })
    .await?;

    let token = issue_token(&state, account.id, Utc::now())?;

    Ok(Json(AuthResponse {
        token,
        account: AccountResponse::from(&account),
    }))
}
