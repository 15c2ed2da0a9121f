//! Ranking definitions and results.

use crate::{
    error::{Result, RondaError},
    types::{MetricKey, Ticker},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, versioned scoring definition: metric key -> weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDefinition {
    /// Unique slug, e.g. `"quality_value"`.
    pub slug: String,
    /// Human readable name.
    pub name: String,
    /// Definition version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Weight per metric key.
    pub weights: BTreeMap<MetricKey, f64>,
}

const fn default_version() -> u32 {
    1
}

impl RankingDefinition {
    /// Create a version 1 definition.
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            version: 1,
            weights: BTreeMap::new(),
        }
    }

    /// Add or replace a weight.
    #[must_use]
    pub fn with_weight(mut self, key: impl Into<MetricKey>, weight: f64) -> Self {
        self.weights.insert(key.into(), weight);
        self
    }

    /// Check the definition is usable.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] for an empty slug, an empty weight
    /// map or a non-finite weight.
    pub fn validate(&self) -> Result<()> {
        if self.slug.trim().is_empty() {
            return Err(RondaError::InvalidData("ranking slug is empty".into()));
        }
        if self.weights.is_empty() {
            return Err(RondaError::InvalidData(format!(
                "ranking '{}' has no weights",
                self.slug
            )));
        }
        if let Some((key, w)) = self.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(RondaError::InvalidData(format!(
                "ranking '{}' has non-finite weight {w} for {key}",
                self.slug
            )));
        }
        Ok(())
    }
}

/// A stored ranking run header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Slug of the definition.
    pub slug: String,
    /// Human readable name.
    pub name: String,
    /// The definition used for the run.
    pub definition: RankingDefinition,
    /// When the run finished.
    pub run_at: DateTime<Utc>,
}

impl Ranking {
    /// Header for a run of `definition` at `run_at`.
    #[must_use]
    pub fn from_definition(definition: RankingDefinition, run_at: DateTime<Utc>) -> Self {
        Self {
            slug: definition.slug.clone(),
            name: definition.name.clone(),
            definition,
            run_at,
        }
    }
}

/// One factor's share of a company's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    /// Raw metric value.
    pub value: f64,
    /// Cross-sectional z-score.
    pub zscore: f64,
    /// Weight from the definition.
    pub weight: f64,
    /// `weight * zscore`.
    pub contribution: f64,
}

/// One company's row in a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// Company.
    pub ticker: Ticker,
    /// Composite score.
    pub score: f64,
    /// 1 = best.
    pub rank: u32,
    /// Per-factor breakdown.
    pub snapshot: BTreeMap<MetricKey, FactorContribution>,
}
