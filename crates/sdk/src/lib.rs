//! # CFBD SDK
//!
//! Rust client for the College Football Data API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfbd_sdk::{CfbdClient, CfbdResult};
//! use cfbd_sdk::queries::GamesQuery;
//!
//! #[tokio::main]
//! async fn main() -> CfbdResult<()> {
//!     // Reads CFB_API_KEY
//!     let client = CfbdClient::from_env()?;
//!
//!     let games = client
//!         .fetch_with::<GamesQuery>(serde_json::json!({"year": 2023, "team": "Alabama"}))
//!         .await?;
//!     println!("{}", games);
//!
//!     Ok(())
//! }
//! ```
//!
//! Every call is a single GET; responses are returned as raw JSON without
//! reshaping. Nothing is cached or retried.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{CfbdClient, CfbdClientBuilder};
pub use config::{load_dotenv, ClientConfig};
pub use error::{CfbdError, CfbdResult, ErrorKind};
pub use transport::{HttpTransport, Upstream};

// Re-export endpoint contracts for convenience
pub use cfbd_core::{queries, Division, Endpoint, EndpointDescriptor, SeasonType, ValidationError};
