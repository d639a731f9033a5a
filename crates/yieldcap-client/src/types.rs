//! Request and response types for the yieldcap client.

use serde::{Deserialize, Serialize};

use yieldcap_core::{AccountId, TransactionId, TransactionKind};

/// Registration request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain password (at least 6 characters).
    pub password: String,
    /// Code of the referring account.
    pub referral_code: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Deposit request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DepositRequest {
    pub amount: f64,
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// The authenticated account.
    pub account: AccountView,
}

/// An account with its totals and remaining cap.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// This account's referral code.
    pub referral_code: String,
    /// Code of the referring account.
    #[serde(default)]
    pub referred_by: Option<String>,
    /// Sum of deposits.
    pub total_invested: f64,
    /// Sum of daily returns and referral bonuses.
    pub total_earned: f64,
    /// Lifetime earnings ceiling.
    pub earnings_cap: f64,
    /// How much more the account may earn.
    pub remaining_cap: f64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// A referred account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralView {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Sum of the referee's deposits.
    pub total_invested: f64,
    /// Registration timestamp (RFC 3339).
    pub created_at: String,
}

/// Deposit acknowledgment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    /// Confirmation message.
    pub message: String,
    /// Journal entry of the deposit.
    pub transaction_id: TransactionId,
    /// Recorded amount.
    pub amount: f64,
}

/// A journal entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    /// Transaction id.
    pub id: TransactionId,
    /// Owning account.
    pub account_id: AccountId,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount.
    pub amount: f64,
    /// Description.
    pub description: String,
    /// Timestamp (RFC 3339).
    pub created_at: String,
}

/// A page of transactions, newest first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// Transactions.
    pub transactions: Vec<TransactionView>,
    /// Whether more transactions follow.
    pub has_more: bool,
}

/// Summary of a daily return run.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReturnReport {
    /// Accounts credited.
    pub processed_count: usize,
    /// Accounts already credited today.
    #[serde(default)]
    pub skipped_already_credited: usize,
    /// Accounts at their earnings cap.
    #[serde(default)]
    pub skipped_at_cap: usize,
    /// Accounts whose credit failed.
    #[serde(default)]
    pub failed: usize,
}

/// Cached totals compared with the journal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Audited account.
    pub account_id: AccountId,
    /// Stored invested total.
    pub cached_invested: f64,
    /// Invested total from the journal.
    pub journal_invested: f64,
    /// Stored earned total.
    pub cached_earned: f64,
    /// Earned total from the journal.
    pub journal_earned: f64,
    /// Both pairs agree.
    pub consistent: bool,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// API error response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
