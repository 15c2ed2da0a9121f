//! Cross-sectional ranking composer.
//!
//! Each weighted metric is standardized across the qualifying companies with
//! population statistics, then combined into a weighted sum. Companies missing
//! any weighted metric are excluded from the run.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use ronda_traits::{
    FactorContribution, MetricKey, MetricStore, ObservationStore, Ranking, RankingDefinition,
    RankingResult, RankingStore, Result, Ticker,
    stats::{StandardizeResult, standardize_population},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Configuration for the ranking composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Fewest qualifying companies for a run to be persisted (default: 1)
    pub min_companies: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { min_companies: 1 }
    }
}

/// Latest metric values of one company.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanySnapshot {
    /// The company.
    pub ticker: Ticker,
    /// Latest value per metric key.
    pub values: BTreeMap<MetricKey, f64>,
}

impl CompanySnapshot {
    /// Snapshot from `(key, value)` pairs.
    #[must_use]
    pub fn new<K: Into<MetricKey>>(
        ticker: impl Into<Ticker>,
        values: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn qualifies(&self, definition: &RankingDefinition) -> bool {
        definition
            .weights
            .keys()
            .all(|k| self.values.get(k).is_some_and(|v| v.is_finite()))
    }
}

/// One weighted metric across the qualifying companies.
#[derive(Debug, Clone)]
pub struct FactorColumn {
    /// Metric key.
    pub key: MetricKey,
    /// Weight from the definition.
    pub weight: f64,
    /// Raw values, one per qualifying company.
    pub values: Array1<f64>,
    /// Population z-scores of `values`.
    pub zscores: Array1<f64>,
    /// Mean and standard deviation used.
    pub stats: StandardizeResult,
}

/// Output of a composed ranking.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Results ordered by rank.
    pub results: Vec<RankingResult>,
    /// Per-factor statistics.
    pub factors: Vec<FactorColumn>,
    /// Companies without every weighted metric.
    pub excluded: Vec<Ticker>,
}

/// A persisted ranking run.
#[derive(Debug, Clone)]
pub struct RankingRun {
    /// Stored header.
    pub ranking: Ranking,
    /// Stored results, ordered by rank.
    pub results: Vec<RankingResult>,
    /// Companies left out of the run.
    pub excluded: Vec<Ticker>,
}

/// Scores companies against a ranking definition.
#[derive(Debug, Clone, Default)]
pub struct RankingComposer {
    config: ComposerConfig,
}

impl RankingComposer {
    /// Create a new composer with the given configuration.
    #[must_use]
    pub const fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    /// Score snapshots without touching any store.
    ///
    /// Ties keep input order; rank 1 is the highest score.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` for an unusable definition.
    pub fn compose(
        &self,
        definition: &RankingDefinition,
        snapshots: &[CompanySnapshot],
    ) -> Result<Composition> {
        definition.validate()?;

        let (qualifying, excluded): (Vec<&CompanySnapshot>, Vec<&CompanySnapshot>) =
            snapshots.iter().partition(|s| s.qualifies(definition));
        let excluded: Vec<Ticker> = excluded.into_iter().map(|s| s.ticker.clone()).collect();
        if !excluded.is_empty() {
            debug!(slug = %definition.slug, excluded = excluded.len(), "companies missing weighted metrics");
        }

        let factors: Vec<FactorColumn> = definition
            .weights
            .iter()
            .map(|(key, &weight)| {
                let values: Array1<f64> = qualifying
                    .iter()
                    .map(|s| s.values.get(key).copied().unwrap_or(f64::NAN))
                    .collect();
                let (zscores, stats) = standardize_population(&values);
                FactorColumn {
                    key: key.clone(),
                    weight,
                    values,
                    zscores,
                    stats,
                }
            })
            .collect();

        let mut scores = Array1::<f64>::zeros(qualifying.len());
        for factor in &factors {
            scores.scaled_add(factor.weight, &factor.zscores);
        }

        let mut order: Vec<usize> = (0..qualifying.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let results = order
            .into_iter()
            .enumerate()
            .map(|(position, i)| RankingResult {
                ticker: qualifying[i].ticker.clone(),
                score: scores[i],
                rank: u32::try_from(position + 1).unwrap_or(u32::MAX),
                snapshot: factors
                    .iter()
                    .map(|f| {
                        let contribution = FactorContribution {
                            value: f.values[i],
                            zscore: f.zscores[i],
                            weight: f.weight,
                            contribution: f.weight * f.zscores[i],
                        };
                        (f.key.clone(), contribution)
                    })
                    .collect(),
            })
            .collect();

        Ok(Composition {
            results,
            factors,
            excluded,
        })
    }

    /// Latest values of the weighted metrics for `tickers`, or every company
    /// when empty.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn collect_snapshots<S>(
        &self,
        store: &S,
        definition: &RankingDefinition,
        tickers: &[Ticker],
    ) -> Result<Vec<CompanySnapshot>>
    where
        S: ObservationStore + MetricStore + ?Sized,
    {
        let universe: Vec<Ticker> = if tickers.is_empty() {
            store.companies()?.into_iter().map(|c| c.ticker).collect()
        } else {
            tickers.to_vec()
        };

        universe
            .into_iter()
            .map(|ticker| -> Result<CompanySnapshot> {
                let latest = store.latest_metrics(&ticker)?;
                let values = latest
                    .into_iter()
                    .filter(|(k, _)| definition.weights.contains_key(k))
                    .map(|(k, m)| (k, m.value))
                    .collect();
                Ok(CompanySnapshot { ticker, values })
            })
            .collect()
    }

    /// Compose and persist a run, replacing the previous results for the
    /// slug in one step.
    ///
    /// Returns `None` and leaves the stored ranking untouched when fewer than
    /// `min_companies` qualify.
    ///
    /// # Errors
    ///
    /// Propagates store errors; a failed replace keeps the previous run.
    pub fn run<S>(
        &self,
        store: &S,
        definition: &RankingDefinition,
        tickers: &[Ticker],
        run_at: DateTime<Utc>,
    ) -> Result<Option<RankingRun>>
    where
        S: ObservationStore + MetricStore + RankingStore + ?Sized,
    {
        let snapshots = self.collect_snapshots(store, definition, tickers)?;
        let composition = self.compose(definition, &snapshots)?;

        if composition.results.len() < self.config.min_companies.max(1) {
            warn!(
                slug = %definition.slug,
                qualifying = composition.results.len(),
                "not enough companies to rank, keeping previous results"
            );
            return Ok(None);
        }

        let ranking = Ranking::from_definition(definition.clone(), run_at);
        store.replace_ranking(&ranking, &composition.results)?;
        info!(
            slug = %definition.slug,
            ranked = composition.results.len(),
            excluded = composition.excluded.len(),
            "ranking stored"
        );

        Ok(Some(RankingRun {
            ranking,
            results: composition.results,
            excluded: composition.excluded,
        }))
    }
}
