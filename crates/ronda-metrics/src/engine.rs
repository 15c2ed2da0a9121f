//! Batch orchestration: resolver, calculators, sink.
//!
//! A company that fails with a non-fatal error is logged and skipped; a
//! storage fault aborts the batch.

use crate::{
    resolver::CompanyInputs,
    sink::{MetricSink, SinkReport},
    technical::{TechnicalCalculator, TechnicalConfig},
    ttm::{TtmCalculator, TtmConfig},
    valuation::{ValuationCalculator, ValuationConfig},
};
use ronda_traits::{MetricStore, ObservationStore, PeriodType, Result, RondaError, Ticker};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Configuration for the recompute engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Statement period type fundamentals are derived from (default: quarter)
    pub period_type: PeriodType,

    /// TTM calculator settings
    pub ttm: TtmConfig,

    /// Valuation calculator settings
    pub valuation: ValuationConfig,

    /// Technical calculator settings
    pub technical: TechnicalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Quarter,
            ttm: TtmConfig::default(),
            valuation: ValuationConfig::default(),
            technical: TechnicalConfig::default(),
        }
    }
}

/// A company skipped during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyFailure {
    /// The company.
    pub ticker: Ticker,
    /// Rendered error.
    pub error: String,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Companies processed successfully.
    pub companies: usize,
    /// Metric rows upserted.
    pub written: usize,
    /// Non-finite values dropped.
    pub skipped: usize,
    /// Companies that failed with a non-fatal error.
    pub failures: Vec<CompanyFailure>,
}

impl BatchReport {
    fn absorb(&mut self, report: SinkReport) {
        self.companies += 1;
        self.written += report.written;
        self.skipped += report.skipped;
    }
}

/// Recomputes derived metrics for one company or a whole universe.
#[derive(Debug, Clone)]
pub struct RecomputeEngine {
    period_type: PeriodType,
    ttm: TtmCalculator,
    valuation: ValuationCalculator,
    technical: TechnicalCalculator,
}

impl RecomputeEngine {
    /// Create a new engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            period_type: config.period_type,
            ttm: TtmCalculator::new(config.ttm),
            valuation: ValuationCalculator::new(config.valuation),
            technical: TechnicalCalculator::new(config.technical),
        }
    }

    /// Statement period type fundamentals are derived from.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    fn load<S>(&self, store: &S, ticker: &Ticker) -> Result<CompanyInputs>
    where
        S: ObservationStore + ?Sized,
    {
        if store.company(ticker)?.is_none() {
            return Err(RondaError::CompanyNotFound(ticker.to_string()));
        }
        CompanyInputs::load(store, ticker, self.period_type)
    }

    /// TTM, growth, margin and valuation metrics for one company.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` for an unknown ticker and propagates store
    /// errors.
    pub fn recompute_company<S>(&self, store: &S, ticker: &Ticker) -> Result<SinkReport>
    where
        S: ObservationStore + MetricStore + ?Sized,
    {
        let inputs = self.load(store, ticker)?;
        let ttm = self.ttm.compute(&inputs);
        let mut points = ttm.points;
        points.extend(self.valuation.compute(&inputs, &ttm.table));
        MetricSink::new(store).write(ticker, points)
    }

    /// Technical indicators for one company.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` for an unknown ticker and propagates store
    /// errors.
    pub fn technicals_company<S>(&self, store: &S, ticker: &Ticker) -> Result<SinkReport>
    where
        S: ObservationStore + MetricStore + ?Sized,
    {
        let inputs = self.load(store, ticker)?;
        let points = self.technical.compute(&inputs);
        MetricSink::new(store).write(ticker, points)
    }

    /// Recompute fundamentals for `tickers`, or every company when empty.
    ///
    /// # Errors
    ///
    /// Only fatal (storage) errors abort the batch.
    pub fn recompute_all<S>(&self, store: &S, tickers: &[Ticker]) -> Result<BatchReport>
    where
        S: ObservationStore + MetricStore + ?Sized,
    {
        self.batch(store, tickers, "recompute", |t| self.recompute_company(store, t))
    }

    /// Compute technicals for `tickers`, or every company when empty.
    ///
    /// # Errors
    ///
    /// Only fatal (storage) errors abort the batch.
    pub fn technicals_all<S>(&self, store: &S, tickers: &[Ticker]) -> Result<BatchReport>
    where
        S: ObservationStore + MetricStore + ?Sized,
    {
        self.batch(store, tickers, "technicals", |t| self.technicals_company(store, t))
    }

    fn batch<S, F>(&self, store: &S, tickers: &[Ticker], job: &str, run: F) -> Result<BatchReport>
    where
        S: ObservationStore + ?Sized,
        F: Fn(&Ticker) -> Result<SinkReport>,
    {
        let universe = if tickers.is_empty() {
            store.companies()?.into_iter().map(|c| c.ticker).collect()
        } else {
            tickers.to_vec()
        };

        let mut report = BatchReport::default();
        for ticker in &universe {
            match run(ticker) {
                Ok(r) => report.absorb(r),
                Err(e) if e.is_fatal() => {
                    error!(%ticker, job, error = %e, "aborting batch");
                    return Err(e);
                }
                Err(e) => {
                    warn!(%ticker, job, error = %e, "skipping company");
                    report.failures.push(CompanyFailure {
                        ticker: ticker.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            job,
            companies = report.companies,
            written = report.written,
            failed = report.failures.len(),
            "batch complete"
        );
        Ok(report)
    }
}

impl Default for RecomputeEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
