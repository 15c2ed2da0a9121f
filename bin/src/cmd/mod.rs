//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands.

pub(crate) mod company;
pub(crate) mod compute;
pub(crate) mod ingest;
pub(crate) mod metrics;
pub(crate) mod prices;
pub(crate) mod query;
pub(crate) mod rank;

use ronda_traits::Ticker;

/// Normalize `--tickers` values; empty means every company.
pub(crate) fn tickers(raw: &[String]) -> Vec<Ticker> {
    raw.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(Ticker::new)
        .collect()
}

/// Print a section banner.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}
