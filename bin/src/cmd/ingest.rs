//! FMP ingestion command.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ronda_fmp::{FmpClient, FmpError, FmpIngestor, IngestConfig, IngestReport, Period};
use ronda_store::SqliteStore;
use ronda_traits::{ObservationStore, Ticker};
use tracing::warn;

/// Options for `ronda ingest fmp`.
#[derive(Debug, Clone)]
pub(crate) struct FmpOptions {
    pub(crate) tickers: Vec<Ticker>,
    pub(crate) annual: bool,
    pub(crate) limit: u32,
    pub(crate) no_prices: bool,
    pub(crate) from: Option<NaiveDate>,
}

/// Pull statements and prices for `tickers`, or every company when empty.
pub(crate) async fn ingest_fmp(
    store: &SqliteStore,
    api_key: Option<String>,
    options: FmpOptions,
) -> Result<()> {
    let client = match api_key {
        Some(key) => FmpClient::new(key),
        None => FmpClient::from_env().context("set FMP_API_KEY or add it to .env")?,
    };
    let config = IngestConfig {
        period: if options.annual {
            Period::Annual
        } else {
            Period::Quarter
        },
        limit: options.limit,
        prices: !options.no_prices,
        prices_from: options.from,
        ..IngestConfig::default()
    };
    let ingestor = FmpIngestor::new(client, config);

    let universe = if options.tickers.is_empty() {
        store.companies()?.into_iter().map(|c| c.ticker).collect()
    } else {
        options.tickers
    };

    let mut total = IngestReport::default();
    let mut failed = 0;
    for ticker in &universe {
        match ingestor.ingest_company(store, ticker).await {
            Ok(report) => {
                println!(
                    "  {:<8} {:>4} statements ({})  {:>6} price bars",
                    ticker,
                    report.statements,
                    report
                        .period_type
                        .map_or_else(|| "-".to_string(), |p| p.to_string()),
                    report.price_bars
                );
                total.merge(&report);
            }
            Err(FmpError::Store(e)) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(%ticker, error = %e, "ingestion failed");
                println!("  {ticker:<8} failed: {e}");
                failed += 1;
            }
        }
    }

    println!(
        "\nIngested {} statements and {} price bars for {} companies ({failed} failed)",
        total.statements,
        total.price_bars,
        universe.len() - failed
    );
    Ok(())
}
