//! CSV price loading.

use anyhow::{Result, bail};
use ronda_traits::{ObservationStore, Ticker, frame::read_price_csv};
use std::path::Path;
use tracing::info;

/// Load daily OHLCV bars for one company from a CSV file.
///
/// Rows without a usable date or close are dropped by the reader.
pub(crate) fn load_prices(store: &dyn ObservationStore, path: &Path, ticker: &str) -> Result<()> {
    let ticker = Ticker::new(ticker);
    if store.company(&ticker)?.is_none() {
        bail!("unknown company {ticker}; add it with `ronda company add {ticker}`");
    }

    let bars = read_price_csv(path)?;
    store.record_price_bars(&ticker, &bars)?;
    info!(%ticker, bars = bars.len(), path = %path.display(), "prices loaded");

    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => println!(
            "Loaded {} bars for {ticker} ({} to {})",
            bars.len(),
            first.date,
            last.date
        ),
        _ => println!("No usable rows in {}", path.display()),
    }
    Ok(())
}
