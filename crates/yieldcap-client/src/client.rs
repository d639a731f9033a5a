//! Yieldcap HTTP client implementation.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    AccountView, ApiErrorResponse, AuditReport, AuthResponse, DailyReturnReport, DepositRequest,
    DepositResponse, HealthResponse, LoginRequest, ReferralView, RegisterRequest,
    TransactionPage,
};

/// Yieldcap API client.
///
/// Account methods take the bearer token returned by [`YieldcapClient::login`] or
/// [`YieldcapClient::register`]; operator methods take the admin key.
#[derive(Debug, Clone)]
pub struct YieldcapClient {
    client: Client,
    base_url: String,
}

impl YieldcapClient {
    /// Create a new yieldcap client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the yieldcap service (e.g., `"http://yieldcap:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new yieldcap client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bearer(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("authorization", format!("Bearer {token}"))
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        self.handle_response(response).await
    }

    /// Register an account under an existing referral code.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for missing fields, an unknown referral code, or a
    /// taken email.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Log in and obtain a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` for wrong credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the caller's account with its remaining cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_account(&self, token: &str) -> Result<AccountView, ClientError> {
        let response = Self::bearer(self.client.get(self.url("/account")), token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the accounts the caller referred, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_referrals(&self, token: &str) -> Result<Vec<ReferralView>, ClientError> {
        let response = Self::bearer(self.client.get(self.url("/account/referrals")), token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Record a deposit for the caller.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the amount is below the minimum.
    pub async fn deposit(&self, token: &str, amount: f64) -> Result<DepositResponse, ClientError> {
        let response = Self::bearer(self.client.post(self.url("/deposit")), token)
            .json(&DepositRequest { amount })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the caller's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions(
        &self,
        token: &str,
        limit: usize,
        offset: usize,
    ) -> Result<TransactionPage, ClientError> {
        let response = Self::bearer(self.client.get(self.url("/transactions")), token)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Trigger the daily return run.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the admin key is rejected.
    pub async fn run_daily_returns(
        &self,
        admin_key: &str,
    ) -> Result<DailyReturnReport, ClientError> {
        let response = self
            .client
            .post(self.url("/admin/run-daily-returns"))
            .header("x-admin-key", admin_key)
            .send()
            .await?;

        let report: DailyReturnReport = self.handle_response(response).await?;
        tracing::debug!(
            processed = report.processed_count,
            failed = report.failed,
            "Daily return run finished"
        );
        Ok(report)
    }

    /// Compare an account's cached totals with its journal.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown account.
    pub async fn audit_account(
        &self,
        admin_key: &str,
        account_id: u64,
    ) -> Result<AuditReport, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/admin/accounts/{account_id}/audit")))
            .header("x-admin-key", admin_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match api_error.error.code.as_str() {
                    "bad_request" => Err(ClientError::Validation { message }),
                    "unauthorized" => Err(ClientError::Unauthorized { message }),
                    "not_found" => Err(ClientError::NotFound { message }),
                    code => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
