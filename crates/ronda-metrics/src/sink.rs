//! Metric sink: persists calculator output to a [`MetricStore`].

use ronda_traits::{DerivedMetricPoint, MetricPoint, MetricStore, Result, Ticker};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of one sink write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    /// Rows upserted.
    pub written: usize,
    /// Points dropped for a non-finite value.
    pub skipped: usize,
}

/// Writes derived points for one company at a time.
///
/// Each point is upserted on (ticker, key, period end, period type), so
/// writing the same batch twice leaves the store unchanged.
#[derive(Debug)]
pub struct MetricSink<'a, S: MetricStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MetricStore + ?Sized> MetricSink<'a, S> {
    /// Create a sink over a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Upsert `points` for `ticker`, dropping NaN and infinite values.
    ///
    /// # Errors
    ///
    /// Propagates store errors; the batch is written in one transaction by
    /// stores that support it.
    pub fn write(&self, ticker: &Ticker, points: Vec<MetricPoint>) -> Result<SinkReport> {
        let total = points.len();
        let rows: Vec<DerivedMetricPoint> = points
            .into_iter()
            .filter(|p| p.value.is_finite())
            .map(|p| p.for_company(ticker))
            .collect();
        let skipped = total - rows.len();
        if skipped > 0 {
            warn!(%ticker, skipped, "dropped non-finite metric values");
        }

        let written = if rows.is_empty() {
            0
        } else {
            self.store.upsert_metrics(&rows)?
        };
        debug!(%ticker, written, "metrics written");
        Ok(SinkReport { written, skipped })
    }
}
