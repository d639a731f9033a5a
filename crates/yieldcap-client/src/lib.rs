//! Yieldcap Client SDK.
//!
//! This crate provides a client library for the yieldcap API, used by front ends and by
//! operator tooling that triggers the daily return run.
//!
//! # Example
//!
//! ```no_run
//! use yieldcap_client::YieldcapClient;
//!
//! # async fn example() -> Result<(), yieldcap_client::ClientError> {
//! let client = YieldcapClient::new("http://yieldcap:8080")?;
//!
//! let session = client.login("ada@example.com", "password123").await?;
//! client.deposit(&session.token, 250.0).await?;
//!
//! let account = client.get_account(&session.token).await?;
//! println!("Remaining cap: {:.2}", account.remaining_cap);
//!
//! // From a cron job
//! let report = client.run_daily_returns("operator-key").await?;
//! println!("Credited {} accounts", report.processed_count);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, YieldcapClient};
pub use error::ClientError;
pub use types::*;
