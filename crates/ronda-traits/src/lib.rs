#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and storage traits for the ronda metric derivation engine.
//!
//! This crate provides the foundational abstractions shared by every other
//! ronda crate: the company / observation / derived-metric data model, the
//! validated field map, the store traits and the error type.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod fields;
pub mod frame;
pub mod ranking;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use fields::{FieldMap, FieldName, RawValue};
pub use ranking::{FactorContribution, Ranking, RankingDefinition, RankingResult};
pub use store::{MetricStore, ObservationStore, RankingStore, Store};
pub use types::{
    Company, Date, DerivedMetricPoint, LatestMetric, MetricKey, MetricPeriod, MetricPoint,
    PeriodType, PriceBar, StatementObservation, StatementType, Ticker, latest_by_key,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
