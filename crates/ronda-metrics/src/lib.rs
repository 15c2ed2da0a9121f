#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

//! Metric calculators for ronda.
//!
//! This crate turns stored statement observations and price bars into
//! derived metric points:
//! - Resolver: first-alias field resolution and as-of joins
//! - TTM: trailing sums, growth rates and margins per quarter
//! - Valuation: market cap, enterprise value and multiples at each quarter
//! - Technical: moving averages, RSI, 52-week range and volatility
//!
//! The [`engine::RecomputeEngine`] drives the calculators over a store and
//! persists their output through the [`sink::MetricSink`].
//!
//! # Example
//!
//! ```ignore
//! use ronda_metrics::RecomputeEngine;
//! use ronda_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let report = RecomputeEngine::default().recompute_all(&store, &[])?;
//! ```

/// The version of the ronda-metrics crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aliases;
pub mod engine;
pub mod registry;
pub mod resolver;
pub mod sink;
pub mod technical;
pub mod ttm;
pub mod valuation;

// Re-export key types
pub use engine::{BatchReport, CompanyFailure, EngineConfig, RecomputeEngine};
pub use registry::{MetricCategory, MetricInfo};
pub use resolver::{AlignedSeries, CompanyInputs, Series, first_alias, value_as_of};
pub use sink::{MetricSink, SinkReport};
pub use technical::{TechnicalCalculator, TechnicalConfig};
pub use ttm::{TtmBase, TtmCalculator, TtmConfig, TtmTable};
pub use valuation::{ValuationCalculator, ValuationConfig};
