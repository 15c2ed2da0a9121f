//! Fetch statements and prices from FMP and record them through the
//! observation boundary.

use crate::{
    FmpClient, FmpError, Result,
    types::{FmpStatement, HistoricalPrice, Period},
};
use chrono::NaiveDate;
use ronda_traits::{ObservationStore, PeriodType, PriceBar, RondaError, Ticker};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Ingestion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Statement period to request first (default: Quarter)
    #[serde(skip, default)]
    pub period: Period,

    /// Statements per request (default: 40)
    pub limit: u32,

    /// Retry with annual statements when quarterly access is refused
    /// (default: true)
    pub annual_fallback: bool,

    /// Fetch daily prices as well (default: true)
    pub prices: bool,

    /// First price date to request (default: none, full history)
    pub prices_from: Option<NaiveDate>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            period: Period::Quarter,
            limit: 40,
            annual_fallback: true,
            prices: true,
            prices_from: None,
        }
    }
}

/// What one company's ingestion recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Statement rows recorded.
    pub statements: usize,
    /// Statement rows dropped for an unusable date.
    pub skipped: usize,
    /// Price bars recorded.
    pub price_bars: usize,
    /// Period the statements were actually recorded under.
    pub period_type: Option<PeriodType>,
}

impl IngestReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: &Self) {
        self.statements += other.statements;
        self.skipped += other.skipped;
        self.price_bars += other.price_bars;
        self.period_type = self.period_type.or(other.period_type);
    }
}

/// Record statement payloads for `ticker`, returning `(recorded, skipped)`.
///
/// # Errors
///
/// Returns an error if the store rejects a row.
pub fn record_statements<S, T>(
    store: &S,
    ticker: &Ticker,
    period_type: PeriodType,
    payloads: &[T],
) -> ronda_traits::Result<(usize, usize)>
where
    S: ObservationStore + ?Sized,
    T: FmpStatement,
{
    let mut recorded = 0;
    let mut skipped = 0;
    for payload in payloads {
        match payload.to_observation(ticker, period_type)? {
            Some(obs) => {
                store.record_statement(&obs)?;
                recorded += 1;
            }
            None => {
                warn!(%ticker, date = payload.date(), "skipping statement with unusable date");
                skipped += 1;
            }
        }
    }
    Ok((recorded, skipped))
}

/// Record daily prices for `ticker`, dropping rows without a date or close.
///
/// # Errors
///
/// Returns an error if the store rejects a bar.
pub fn record_prices<S: ObservationStore + ?Sized>(
    store: &S,
    ticker: &Ticker,
    prices: &[HistoricalPrice],
) -> ronda_traits::Result<usize> {
    let bars: Vec<PriceBar> = prices.iter().filter_map(HistoricalPrice::to_bar).collect();
    if bars.len() < prices.len() {
        warn!(%ticker, dropped = prices.len() - bars.len(), "dropping malformed price rows");
    }
    store.record_price_bars(ticker, &bars)?;
    Ok(bars.len())
}

/// Pulls FMP data into an observation store.
#[derive(Debug, Clone)]
pub struct FmpIngestor {
    client: FmpClient,
    config: IngestConfig,
}

impl FmpIngestor {
    /// Create an ingestor.
    #[must_use]
    pub const fn new(client: FmpClient, config: IngestConfig) -> Self {
        Self { client, config }
    }

    /// Ingestion settings.
    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Fetch the three statements for one period and record them.
    async fn ingest_period<S: ObservationStore + ?Sized>(
        &self,
        store: &S,
        ticker: &Ticker,
        period: Period,
    ) -> Result<IngestReport> {
        let symbol = ticker.as_str();
        let limit = Some(self.config.limit);
        let period_type = period.period_type();

        let income = self.client.income_statement(symbol, period, limit).await?;
        let balance = self.client.balance_sheet(symbol, period, limit).await?;
        let cash_flow = self.client.cash_flow(symbol, period, limit).await?;

        let mut report = IngestReport {
            period_type: Some(period_type),
            ..IngestReport::default()
        };
        for (recorded, skipped) in [
            record_statements(store, ticker, period_type, &income)?,
            record_statements(store, ticker, period_type, &balance)?,
            record_statements(store, ticker, period_type, &cash_flow)?,
        ] {
            report.statements += recorded;
            report.skipped += skipped;
        }
        Ok(report)
    }

    /// Ingest statements and prices for one company.
    ///
    /// Quarterly statements fall back to annual ones when the key has no
    /// quarterly access.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails after retries, or the store
    /// rejects a row.
    pub async fn ingest_company<S: ObservationStore + ?Sized>(
        &self,
        store: &S,
        ticker: &Ticker,
    ) -> Result<IngestReport> {
        if store.company(ticker)?.is_none() {
            return Err(FmpError::Store(RondaError::CompanyNotFound(
                ticker.to_string(),
            )));
        }

        let period = if self.client.is_demo_key() {
            Period::Annual
        } else {
            self.config.period
        };

        let mut report = match self.ingest_period(store, ticker, period).await {
            Err(e)
                if e.is_access_denied()
                    && period == Period::Quarter
                    && self.config.annual_fallback =>
            {
                warn!(%ticker, error = %e, "quarterly statements refused, retrying with annual");
                self.ingest_period(store, ticker, Period::Annual).await?
            }
            other => other?,
        };

        if self.config.prices {
            let prices = self
                .client
                .historical_prices(ticker.as_str(), self.config.prices_from, None)
                .await?;
            report.price_bars = record_prices(store, ticker, &prices)?;
        }

        info!(
            %ticker,
            statements = report.statements,
            price_bars = report.price_bars,
            "ingested"
        );
        Ok(report)
    }
}
