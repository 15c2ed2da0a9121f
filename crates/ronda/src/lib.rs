#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Financial metric derivation engine for listed companies.
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience. It turns raw statement observations and daily prices into
//! derived metrics (TTM sums, growth, margins, valuation multiples and
//! technical indicators) and composes weighted z-score rankings from them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::prelude::*;
//!
//! # fn main() -> ronda::Result<()> {
//! let store = SqliteStore::new("ronda.db")?;
//!
//! // Derive TTM, growth, margin and valuation metrics for every company
//! let report = RecomputeEngine::default().recompute_all(&store, &[])?;
//! println!("{} points written", report.written);
//!
//! // Rank companies on the built-in definition
//! let def = ronda::rank::quality_value();
//! RankingComposer::default().run(&store, &def, &[], chrono::Utc::now())?;
//! let board = Leaderboard::load(&store, &def.slug)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model, field registry, store traits and the error type
//! - [`store`] - In-memory and SQLite stores
//! - [`metrics`] - Series resolution and the metric calculators
//! - [`rank`] - Ranking definitions, composition and leaderboards
//! - [`fmp`] - Financial Modeling Prep ingestion
//!
//! ## Pipeline
//!
//! 1. **Ingestion** records statement rows (merged per field) and price bars
//! 2. **Resolution** picks the first available alias per date and aligns series
//! 3. **Calculators** derive TTM, growth, valuation and technical points
//! 4. **The sink** upserts finite points keyed by (company, key, date, period)
//! 5. **The composer** standardizes metrics across companies and ranks them

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types, field registry, store traits and errors.
pub mod traits {
    pub use ronda_traits::*;
}

// Re-export error types
pub use ronda_traits::{Result, RondaError};

// Re-export common types
pub use ronda_traits::{
    Company, Date, DerivedMetricPoint, LatestMetric, MetricKey, MetricPeriod, PeriodType,
    PriceBar, StatementObservation, StatementType, Ticker,
};

// Re-export store traits
pub use ronda_traits::{MetricStore, ObservationStore, RankingStore, Store};

/// Storage backends.
pub mod store {
    pub use ronda_store::*;
}

/// Metric derivation.
///
/// ## Calculators
///
/// - **TtmCalculator**: trailing twelve month sums, YoY growth and margins
/// - **ValuationCalculator**: market cap, enterprise value and multiples
/// - **TechnicalCalculator**: moving averages, RSI, 52-week range and volatility
///
/// [`metrics::RecomputeEngine`] drives them per company and writes through
/// [`metrics::MetricSink`].
pub mod metrics {
    pub use ronda_metrics::*;
}

/// Ranking composition.
pub mod rank {
    pub use ronda_rank::*;
}

/// Financial Modeling Prep (FMP) ingestion.
///
/// ## Setup
///
/// 1. Get an API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add it to a `.env` file
pub mod fmp {
    pub use ronda_fmp::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Company, MetricPeriod, MetricStore, ObservationStore, PeriodType, RankingStore, Result,
        RondaError, Store, Ticker,
    };
    pub use ronda_metrics::{RecomputeEngine, TechnicalCalculator, TtmCalculator, ValuationCalculator};
    pub use ronda_rank::{Leaderboard, RankingComposer};
    pub use ronda_store::{MemoryStore, SqliteStore};
}
