//! Ranking commands.

use anyhow::{Result, bail};
use chrono::Utc;
use ronda_rank::{
    ComposerConfig, Leaderboard, QUALITY_VALUE, RankingComposer, builtin, builtin_definitions,
    leaderboard_frame, load_definition,
};
use ronda_store::SqliteStore;
use ronda_traits::{RankingDefinition, Ticker};
use std::path::Path;

fn resolve_definition(definition: Option<&Path>, slug: Option<&str>) -> Result<RankingDefinition> {
    if let Some(path) = definition {
        return Ok(load_definition(path)?);
    }
    let slug = slug.unwrap_or(QUALITY_VALUE);
    match builtin(slug) {
        Some(def) => Ok(def),
        None => {
            let known: Vec<String> = builtin_definitions().into_iter().map(|d| d.slug).collect();
            bail!("unknown ranking '{slug}' (built-in: {})", known.join(", "))
        }
    }
}

/// Compose and store a ranking run, then print its top entries.
pub(crate) fn run_ranking(
    store: &SqliteStore,
    definition: Option<&Path>,
    slug: Option<&str>,
    tickers: &[Ticker],
    min_companies: usize,
    top: usize,
) -> Result<()> {
    let def = resolve_definition(definition, slug)?;
    let composer = RankingComposer::new(ComposerConfig { min_companies });

    super::banner(&def.name);
    for (key, weight) in &def.weights {
        println!("  {key:<18} weight {weight:>6.2}");
    }
    println!();

    let Some(run) = composer.run(store, &def, tickers, Utc::now())? else {
        println!("Not enough companies with every weighted metric; previous results kept.");
        return Ok(());
    };

    println!(
        "Ranked {} companies ({} excluded for missing metrics)",
        run.results.len(),
        run.excluded.len()
    );
    let shown = &run.results[..top.min(run.results.len())];
    println!("{}", leaderboard_frame(shown)?);
    Ok(())
}

/// Print the stored leaderboard for a slug.
pub(crate) fn show_leaderboard(store: &SqliteStore, slug: &str, top: usize) -> Result<()> {
    let board = Leaderboard::load(store, slug)?;
    println!(
        "{} (v{}), run at {}",
        board.ranking.name,
        board.ranking.definition.version,
        board.ranking.run_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("{}", leaderboard_frame(board.top(top))?);
    Ok(())
}
