//! Stored leaderboards and their tabular form.

use polars::prelude::*;
use ronda_traits::{Ranking, RankingResult, RankingStore, Result, RondaError};
use std::collections::BTreeSet;

/// A stored ranking run with its ordered results.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    /// Run header.
    pub ranking: Ranking,
    /// Results ordered by rank.
    pub results: Vec<RankingResult>,
}

impl Leaderboard {
    /// Load the current run for `slug`.
    ///
    /// # Errors
    ///
    /// Returns `RankingNotFound` when the slug has never been run.
    pub fn load<S: RankingStore + ?Sized>(store: &S, slug: &str) -> Result<Self> {
        let ranking = store
            .ranking(slug)?
            .ok_or_else(|| RondaError::RankingNotFound(slug.to_string()))?;
        let results = store.leaderboard(slug)?;
        Ok(Self { ranking, results })
    }

    /// The best `n` results.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankingResult] {
        &self.results[..n.min(self.results.len())]
    }
}

/// `rank | ticker | score | z_<key>...` frame, one z-score column per
/// factor key found in any snapshot.
///
/// # Errors
///
/// Returns an error if the frame cannot be built.
pub fn leaderboard_frame(results: &[RankingResult]) -> Result<DataFrame> {
    let ranks: Vec<u32> = results.iter().map(|r| r.rank).collect();
    let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();

    let mut df = df! {
        "rank" => ranks,
        "ticker" => tickers,
        "score" => scores,
    }?;

    let keys: BTreeSet<&str> = results
        .iter()
        .flat_map(|r| r.snapshot.keys().map(String::as_str))
        .collect();
    for key in keys {
        let z: Vec<Option<f64>> = results
            .iter()
            .map(|r| r.snapshot.get(key).map(|c| c.zscore))
            .collect();
        df.with_column(Series::new(format!("z_{key}").into(), z))?;
    }
    Ok(df)
}
