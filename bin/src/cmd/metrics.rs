//! Metric registry listing.

use anyhow::{Result, bail};
use ronda_metrics::{
    MetricCategory,
    registry::{available_categories, metrics_by_category},
};

/// List the metrics ronda derives, optionally for one category.
pub(crate) fn list_metrics(category: Option<String>, verbose: bool) -> Result<()> {
    super::banner("Available Metrics");

    let categories = match category {
        Some(name) => match MetricCategory::parse(&name) {
            Some(c) => vec![c],
            None => {
                let names: Vec<String> =
                    available_categories().iter().map(|c| format!("{c:?}")).collect();
                bail!("unknown category '{name}' (expected one of: {})", names.join(", "));
            }
        },
        None => available_categories(),
    };

    for cat in categories {
        println!("{cat:?}: {}", cat.description());
        println!("{}", "-".repeat(60));
        for info in metrics_by_category(&cat) {
            if verbose {
                let periods: Vec<&str> = info.periods.iter().map(|p| p.as_str()).collect();
                println!(
                    "  {:18} [{:>5}] {}",
                    info.key,
                    periods.join("/"),
                    info.description
                );
            } else {
                println!("  {}", info.key);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for periods and descriptions.\n");
    }
    Ok(())
}
