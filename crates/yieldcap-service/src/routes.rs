//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, admin, auth, deposits, health, transactions};
use crate::state::AppState;

/// Maximum concurrent requests for account endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 256;

/// Maximum concurrent operator requests.
const ADMIN_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /auth/register` - Register under a referral code
/// - `POST /auth/login` - Exchange credentials for a bearer token
///
/// ## Account (bearer JWT)
/// - `GET /account` - Current account and remaining cap
/// - `GET /account/referrals` - Accounts referred by the caller
/// - `POST /deposit` - Record a deposit
/// - `GET /transactions` - Transaction history, newest first
///
/// ## Admin (`X-Admin-Key`)
/// - `POST /admin/run-daily-returns` - Credit today's daily returns
/// - `GET /admin/accounts/:id/audit` - Compare cached totals with the journal
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/account", get(accounts::get_account))
        .route("/account/referrals", get(accounts::list_referrals))
        .route("/deposit", post(deposits::deposit))
        .route("/transactions", get(transactions::list_transactions))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    let admin_routes = Router::new()
        .route("/run-daily-returns", post(admin::run_daily_returns))
        .route("/accounts/:id/audit", get(admin::audit_account))
        .layer(ConcurrencyLimitLayer::new(ADMIN_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no limit)
        .route("/health", get(health::health))
        .merge(api_routes)
        .nest("/admin", admin_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
