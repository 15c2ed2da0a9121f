//! Read-side queries: metric series and latest values.

use anyhow::{Result, bail};
use ronda_traits::{
    MetricPeriod, MetricStore, ObservationStore, Ticker,
    frame::{latest_frame, series_frame},
};

/// Print one metric's history for a company.
pub(crate) fn show_series<S>(
    store: &S,
    ticker: &str,
    key: &str,
    period: Option<MetricPeriod>,
) -> Result<()>
where
    S: ObservationStore + MetricStore,
{
    let ticker = Ticker::new(ticker);
    if store.company(&ticker)?.is_none() {
        bail!("unknown company {ticker}");
    }

    let points = store.metric_series(&ticker, key, period)?;
    if points.is_empty() {
        println!("No {key} values for {ticker}");
        return Ok(());
    }
    println!("{ticker} {key}");
    println!("{}", series_frame(&points)?);
    Ok(())
}

/// Print the latest value of every metric for a company.
pub(crate) fn show_latest<S>(store: &S, ticker: &str) -> Result<()>
where
    S: ObservationStore + MetricStore,
{
    let ticker = Ticker::new(ticker);
    if store.company(&ticker)?.is_none() {
        bail!("unknown company {ticker}");
    }

    let latest = store.latest_metrics(&ticker)?;
    if latest.is_empty() {
        println!("No metrics for {ticker}; run `ronda recompute` first");
        return Ok(());
    }
    println!("{}", latest_frame(&latest)?);
    Ok(())
}
