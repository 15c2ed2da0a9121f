//! In-memory store.
//!
//! Every table is an ordered map behind one `RwLock`, so ranges come out
//! sorted and a ranking replace happens inside a single write critical
//! section.

use ronda_traits::{
    Company, Date, DerivedMetricPoint, FieldMap, LatestMetric, MetricKey, MetricPeriod,
    MetricStore, ObservationStore, PeriodType, PriceBar, Ranking, RankingResult, RankingStore,
    Result, RondaError, StatementObservation, StatementType, Ticker, latest_by_key,
};
use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

type StatementKey = (Ticker, StatementType, PeriodType, Date);
type MetricRowKey = (Ticker, MetricKey, Date, MetricPeriod);

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<Ticker, Company>,
    statements: BTreeMap<StatementKey, FieldMap>,
    prices: BTreeMap<(Ticker, Date), PriceBar>,
    metrics: BTreeMap<MetricRowKey, f64>,
    rankings: BTreeMap<String, (Ranking, Vec<RankingResult>)>,
}

impl Tables {
    fn require_company(&self, ticker: &Ticker) -> Result<()> {
        if self.companies.contains_key(ticker) {
            Ok(())
        } else {
            Err(RondaError::CompanyNotFound(ticker.to_string()))
        }
    }
}

/// A store held entirely in memory.
///
/// # Example
///
/// ```
/// use ronda_store::MemoryStore;
/// use ronda_traits::{Company, ObservationStore};
///
/// let store = MemoryStore::new();
/// store.upsert_company(&Company::new("aapl", "Apple Inc.")).unwrap();
/// assert_eq!(store.companies().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RondaError::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RondaError::Storage("memory store lock poisoned".into()))
    }
}

impl ObservationStore for MemoryStore {
    fn upsert_company(&self, company: &Company) -> Result<()> {
        self.write()?
            .companies
            .insert(company.ticker.clone(), company.clone());
        Ok(())
    }

    fn company(&self, ticker: &Ticker) -> Result<Option<Company>> {
        Ok(self.read()?.companies.get(ticker).cloned())
    }

    fn companies(&self) -> Result<Vec<Company>> {
        Ok(self.read()?.companies.values().cloned().collect())
    }

    fn delete_company(&self, ticker: &Ticker) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.companies.remove(ticker).is_none() {
            return Ok(false);
        }
        tables.statements.retain(|(t, ..), _| t != ticker);
        tables.prices.retain(|(t, _), _| t != ticker);
        tables.metrics.retain(|(t, ..), _| t != ticker);
        for (_, results) in tables.rankings.values_mut() {
            results.retain(|r| &r.ticker != ticker);
        }
        debug!(%ticker, "deleted company and dependent rows");
        Ok(true)
    }

    fn record_statement(&self, observation: &StatementObservation) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_company(&observation.ticker)?;
        let key = (
            observation.ticker.clone(),
            observation.statement_type,
            observation.period_type,
            observation.period_end,
        );
        tables
            .statements
            .entry(key)
            .or_default()
            .merge(&observation.fields);
        Ok(())
    }

    fn statements(
        &self,
        ticker: &Ticker,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<Vec<StatementObservation>> {
        let tables = self.read()?;
        let lo = (ticker.clone(), statement_type, period_type, Date::MIN);
        let hi = (ticker.clone(), statement_type, period_type, Date::MAX);
        Ok(tables
            .statements
            .range(lo..=hi)
            .map(|((t, st, pt, end), fields)| {
                StatementObservation::new(t.clone(), *st, *pt, *end, fields.clone())
            })
            .collect())
    }

    fn record_price_bar(&self, ticker: &Ticker, bar: &PriceBar) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_company(ticker)?;
        tables.prices.insert((ticker.clone(), bar.date), bar.clone());
        Ok(())
    }

    fn price_bars(&self, ticker: &Ticker) -> Result<Vec<PriceBar>> {
        let tables = self.read()?;
        Ok(tables
            .prices
            .range((ticker.clone(), Date::MIN)..=(ticker.clone(), Date::MAX))
            .map(|(_, bar)| bar.clone())
            .collect())
    }
}

impl MetricStore for MemoryStore {
    fn upsert_metric(&self, point: &DerivedMetricPoint) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_company(&point.ticker)?;
        tables.metrics.insert(
            (
                point.ticker.clone(),
                point.key.clone(),
                point.period_end,
                point.period_type,
            ),
            point.value,
        );
        Ok(())
    }

    fn upsert_metrics(&self, points: &[DerivedMetricPoint]) -> Result<usize> {
        let mut tables = self.write()?;
        for point in points {
            tables.require_company(&point.ticker)?;
            tables.metrics.insert(
                (
                    point.ticker.clone(),
                    point.key.clone(),
                    point.period_end,
                    point.period_type,
                ),
                point.value,
            );
        }
        Ok(points.len())
    }

    fn metric_series(
        &self,
        ticker: &Ticker,
        key: &str,
        period_type: Option<MetricPeriod>,
    ) -> Result<Vec<(Date, MetricPeriod, f64)>> {
        let tables = self.read()?;
        let lo = (ticker.clone(), key.to_string(), Date::MIN, MetricPeriod::Quarter);
        let hi = (ticker.clone(), key.to_string(), Date::MAX, MetricPeriod::Daily);
        Ok(tables
            .metrics
            .range(lo..=hi)
            .filter(|((.., p), _)| period_type.is_none_or(|want| want == *p))
            .map(|((_, _, date, p), value)| (*date, *p, *value))
            .collect())
    }

    fn latest_metrics(&self, ticker: &Ticker) -> Result<BTreeMap<MetricKey, LatestMetric>> {
        let tables = self.read()?;
        let lo = (ticker.clone(), String::new(), Date::MIN, MetricPeriod::Quarter);
        let rows = tables
            .metrics
            .range(lo..)
            .take_while(|((t, ..), _)| t == ticker)
            .map(|((t, key, end, period), value)| DerivedMetricPoint {
                ticker: t.clone(),
                key: key.clone(),
                period_end: *end,
                period_type: *period,
                value: *value,
            });
        Ok(latest_by_key(rows))
    }
}

impl RankingStore for MemoryStore {
    fn replace_ranking(&self, ranking: &Ranking, results: &[RankingResult]) -> Result<()> {
        let mut tables = self.write()?;
        // Validate everything before touching the table so a failure leaves
        // the previous run in place.
        for result in results {
            tables.require_company(&result.ticker)?;
        }
        tables
            .rankings
            .insert(ranking.slug.clone(), (ranking.clone(), results.to_vec()));
        debug!(slug = %ranking.slug, rows = results.len(), "replaced ranking");
        Ok(())
    }

    fn ranking(&self, slug: &str) -> Result<Option<Ranking>> {
        Ok(self.read()?.rankings.get(slug).map(|(r, _)| r.clone()))
    }

    fn leaderboard(&self, slug: &str) -> Result<Vec<RankingResult>> {
        let tables = self.read()?;
        let (_, results) = tables
            .rankings
            .get(slug)
            .ok_or_else(|| RondaError::RankingNotFound(slug.to_string()))?;
        let mut out = results.clone();
        out.sort_by_key(|r| r.rank);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_traits::fields::{NET_INCOME, REVENUE};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn store_with(ticker: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store.upsert_company(&Company::new(ticker, ticker)).unwrap();
        store
    }

    #[test]
    fn test_statement_merge_keeps_old_fields() {
        let store = store_with("AAA");
        let t = Ticker::new("AAA");
        let mut first = FieldMap::new();
        first.set(REVENUE, 100.0).unwrap();
        first.set(NET_INCOME, 10.0).unwrap();
        store
            .record_statement(&StatementObservation::new(
                "AAA",
                StatementType::Income,
                PeriodType::Quarter,
                d(2024, 3, 31),
                first,
            ))
            .unwrap();

        let mut second = FieldMap::new();
        second.set(REVENUE, 120.0).unwrap();
        second.set_null(NET_INCOME).unwrap();
        store
            .record_statement(&StatementObservation::new(
                "AAA",
                StatementType::Income,
                PeriodType::Quarter,
                d(2024, 3, 31),
                second,
            ))
            .unwrap();

        let rows = store
            .statements(&t, StatementType::Income, PeriodType::Quarter)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields.get(REVENUE).and_then(|v| v.to_finite()), Some(120.0));
        assert_eq!(rows[0].fields.get(NET_INCOME).and_then(|v| v.to_finite()), Some(10.0));
    }

    #[test]
    fn test_unknown_company_rejected() {
        let store = MemoryStore::new();
        let err = store
            .record_price_bar(&Ticker::new("ZZZ"), &PriceBar::from_close(d(2024, 1, 2), 1.0))
            .unwrap_err();
        assert!(matches!(err, RondaError::CompanyNotFound(_)));
    }

    #[test]
    fn test_statements_isolated_by_ticker() {
        let store = store_with("AAA");
        store.upsert_company(&Company::new("AAB", "other")).unwrap();
        for t in ["AAA", "AAB"] {
            store
                .record_statement(&StatementObservation::new(
                    t,
                    StatementType::Income,
                    PeriodType::Quarter,
                    d(2024, 3, 31),
                    FieldMap::new().with(REVENUE, 1.0).unwrap(),
                ))
                .unwrap();
        }
        let rows = store
            .statements(&Ticker::new("AAA"), StatementType::Income, PeriodType::Quarter)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
