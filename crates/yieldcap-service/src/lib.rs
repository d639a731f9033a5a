//! Yieldcap HTTP API Service.
//!
//! This crate provides the HTTP API for the yieldcap ledger, including:
//!
//! - Registration and login
//! - Account view and referral listing
//! - Deposits and transaction history
//! - The operator-triggered daily return batch and ledger audit
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Bearer JWTs** - Issued by `/auth/register` and `/auth/login` for account requests
//! 2. **Admin key** - The `X-Admin-Key` header for operator endpoints

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers stay async for axum's Handler bound

pub mod auth;
pub mod batch;
pub mod bootstrap;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use batch::{run_daily_returns, DailyReturnReport};
pub use config::{BootstrapConfig, ConfigError, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
