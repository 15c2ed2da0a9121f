//! Metric recomputation commands.

use anyhow::Result;
use ronda_metrics::{BatchReport, RecomputeEngine};
use ronda_store::SqliteStore;
use ronda_traits::Ticker;

fn print_report(job: &str, report: &BatchReport) {
    println!(
        "{job}: {} companies, {} points written, {} non-finite values skipped",
        report.companies, report.written, report.skipped
    );
    if !report.failures.is_empty() {
        println!("\nSkipped companies:");
        for f in &report.failures {
            println!("  {:<8} {}", f.ticker, f.error);
        }
    }
}

/// TTM, growth, margin and valuation metrics.
pub(crate) fn recompute(store: &SqliteStore, tickers: &[Ticker]) -> Result<()> {
    let report = RecomputeEngine::default().recompute_all(store, tickers)?;
    print_report("Recompute", &report);
    Ok(())
}

/// Technical indicators from daily prices.
pub(crate) fn technicals(store: &SqliteStore, tickers: &[Ticker]) -> Result<()> {
    let report = RecomputeEngine::default().technicals_all(store, tickers)?;
    print_report("Technicals", &report);
    Ok(())
}
