#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial Modeling Prep (FMP) ingestion adapter for ronda.
//!
//! This crate fetches financial statements and daily prices from the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API,
//! normalizes them to ronda field names and records them through an
//! [`ronda_traits::ObservationStore`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use ronda_fmp::{FmpClient, FmpIngestor, IngestConfig};
//! use ronda_store::SqliteStore;
//! use ronda_traits::Ticker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("ronda.db")?;
//!     let ingestor = FmpIngestor::new(FmpClient::from_env()?, IngestConfig::default());
//!
//!     let report = ingestor.ingest_company(&store, &Ticker::new("AAPL")).await?;
//!     println!("{} statements, {} bars", report.statements, report.price_bars);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

/// The version of the ronda-fmp crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod client;
mod error;
mod ingest;
mod retry;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use ingest::{FmpIngestor, IngestConfig, IngestReport, record_prices, record_statements};
pub use retry::RetryPolicy;
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
