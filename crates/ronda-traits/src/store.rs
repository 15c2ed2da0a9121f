//! Storage traits for observations, derived metrics and rankings.
//!
//! These traits are the boundary between the engine and its persistence.
//! Ingestion adapters write through [`ObservationStore`], calculators read
//! from it and write through [`MetricStore`], and the ranking composer writes
//! through [`RankingStore`].
//!
//! All methods take `&self`; implementations use interior locking so a store
//! can be shared across threads and a reader never observes a torn row.
//!
//! # Example
//!
//! ```no_run
//! use ronda_traits::{Company, ObservationStore, Result};
//!
//! fn seed(store: &dyn ObservationStore) -> Result<()> {
//!     store.upsert_company(&Company::new("AAPL", "Apple Inc."))?;
//!     Ok(())
//! }
//! ```

use crate::{
    error::Result,
    ranking::{Ranking, RankingResult},
    types::{
        Company, Date, DerivedMetricPoint, LatestMetric, MetricKey, MetricPeriod, PeriodType,
        PriceBar, StatementObservation, StatementType, Ticker,
    },
};
use std::collections::BTreeMap;

/// Durable per-company raw statements and price bars.
pub trait ObservationStore: Send + Sync {
    /// Insert a company or update its descriptive fields.
    fn upsert_company(&self, company: &Company) -> Result<()>;

    /// Look up a company by ticker.
    fn company(&self, ticker: &Ticker) -> Result<Option<Company>>;

    /// All companies, ordered by ticker.
    fn companies(&self) -> Result<Vec<Company>>;

    /// Delete a company and every statement, price bar, metric and ranking
    /// result that belongs to it. Returns whether the company existed.
    fn delete_company(&self, ticker: &Ticker) -> Result<bool>;

    /// Record a statement observation with field-level merge.
    ///
    /// If a row already exists for (ticker, statement type, period type,
    /// period end), non-null fields of `observation` override stored values
    /// and every other stored field is kept.
    ///
    /// # Errors
    ///
    /// [`crate::RondaError::CompanyNotFound`] if the company is unknown.
    fn record_statement(&self, observation: &StatementObservation) -> Result<()>;

    /// Statement rows for one company, ascending by period end.
    fn statements(
        &self,
        ticker: &Ticker,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<Vec<StatementObservation>>;

    /// Record a price bar, replacing any existing bar for that date.
    ///
    /// # Errors
    ///
    /// [`crate::RondaError::CompanyNotFound`] if the company is unknown.
    fn record_price_bar(&self, ticker: &Ticker, bar: &PriceBar) -> Result<()>;

    /// Record many price bars.
    fn record_price_bars(&self, ticker: &Ticker, bars: &[PriceBar]) -> Result<()> {
        bars.iter().try_for_each(|bar| self.record_price_bar(ticker, bar))
    }

    /// Price bars for one company, ascending by date.
    fn price_bars(&self, ticker: &Ticker) -> Result<Vec<PriceBar>>;
}

/// Per-company derived metric time series.
pub trait MetricStore: Send + Sync {
    /// Insert or overwrite one derived point.
    ///
    /// The unique key is (ticker, metric key, period end, period type).
    fn upsert_metric(&self, point: &DerivedMetricPoint) -> Result<()>;

    /// Insert or overwrite many derived points.
    fn upsert_metrics(&self, points: &[DerivedMetricPoint]) -> Result<usize> {
        for point in points {
            self.upsert_metric(point)?;
        }
        Ok(points.len())
    }

    /// One metric's series for a company, ascending by period end.
    ///
    /// With `period_type` set only that period type is returned.
    fn metric_series(
        &self,
        ticker: &Ticker,
        key: &str,
        period_type: Option<MetricPeriod>,
    ) -> Result<Vec<(Date, MetricPeriod, f64)>>;

    /// Latest value per metric key for a company.
    fn latest_metrics(&self, ticker: &Ticker) -> Result<BTreeMap<MetricKey, LatestMetric>>;
}

/// Ranking runs and their leaderboards.
pub trait RankingStore: Send + Sync {
    /// Atomically replace the results of `ranking.slug`.
    ///
    /// Either every prior result is removed and all of `results` become
    /// visible, or nothing changes.
    fn replace_ranking(&self, ranking: &Ranking, results: &[RankingResult]) -> Result<()>;

    /// The header of the latest run for a slug.
    fn ranking(&self, slug: &str) -> Result<Option<Ranking>>;

    /// Results of the latest run, ordered by rank.
    ///
    /// # Errors
    ///
    /// [`crate::RondaError::RankingNotFound`] if the slug was never run.
    fn leaderboard(&self, slug: &str) -> Result<Vec<RankingResult>>;
}

/// Everything the engine needs from one backend.
pub trait Store: ObservationStore + MetricStore + RankingStore {}

impl<T: ObservationStore + MetricStore + RankingStore> Store for T {}
