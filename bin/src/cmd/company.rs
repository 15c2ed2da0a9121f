//! Company management commands.

use anyhow::{Result, bail};
use ronda_traits::{Company, ObservationStore, Ticker};

/// Insert or update a company.
pub(crate) fn add_company(
    store: &dyn ObservationStore,
    ticker: &str,
    name: Option<String>,
    sector: Option<String>,
    currency: Option<String>,
    cik: Option<String>,
) -> Result<()> {
    let ticker = Ticker::new(ticker);
    if ticker.as_str().is_empty() {
        bail!("ticker must not be empty");
    }

    let name = name.unwrap_or_else(|| ticker.to_string());
    let mut company = Company::new(ticker, name);
    if let Some(sector) = sector {
        company = company.with_sector(sector);
    }
    if let Some(currency) = currency {
        company = company.with_currency(currency);
    }
    if let Some(cik) = cik {
        company = company.with_cik(cik);
    }

    store.upsert_company(&company)?;
    println!("Saved {} ({})", company.ticker, company.name);
    Ok(())
}

/// Print every known company.
pub(crate) fn list_companies(store: &dyn ObservationStore) -> Result<()> {
    let companies = store.companies()?;
    if companies.is_empty() {
        println!("No companies. Add one with `ronda company add <TICKER>`.");
        return Ok(());
    }

    println!("{:<8} {:<32} {:<20} {:<5} CIK", "Ticker", "Name", "Sector", "Ccy");
    println!("{}", "-".repeat(76));
    for c in &companies {
        println!(
            "{:<8} {:<32} {:<20} {:<5} {}",
            c.ticker,
            c.name,
            c.sector.as_deref().unwrap_or("-"),
            c.currency,
            c.cik.as_deref().unwrap_or("-"),
        );
    }
    println!("\n{} companies", companies.len());
    Ok(())
}

/// Delete a company with everything recorded for it.
pub(crate) fn remove_company(store: &dyn ObservationStore, ticker: &str) -> Result<()> {
    let ticker = Ticker::new(ticker);
    if store.delete_company(&ticker)? {
        println!("Removed {ticker}");
    } else {
        bail!("unknown company {ticker}");
    }
    Ok(())
}
