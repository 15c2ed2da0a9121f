//! SQLite persistence for observations, derived metrics and rankings.
//!
//! Field maps, ranking definitions and factor snapshots are stored as JSON
//! text. Child tables reference `companies` with `ON DELETE CASCADE`, so
//! deleting a company removes everything that hangs off it.

use ronda_traits::{
    Company, Date, DerivedMetricPoint, FieldMap, LatestMetric, MetricKey, MetricPeriod,
    MetricStore, ObservationStore, PeriodType, PriceBar, Ranking, RankingResult, RankingStore,
    Result, RondaError, StatementObservation, StatementType, Ticker, latest_by_key,
};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, info};

fn storage(e: rusqlite::Error) -> RondaError {
    RondaError::Storage(e.to_string())
}

/// SQLite store for all ronda data.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Storage`] if the database cannot be opened or
    /// the schema cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!(path = %path.as_ref().display(), "SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Storage`] if the schema cannot be created.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RondaError::Storage("sqlite connection lock poisoned".into()))
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS companies (
                ticker TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector TEXT,
                currency TEXT NOT NULL DEFAULT 'USD',
                cik TEXT
            );

            CREATE TABLE IF NOT EXISTS statements (
                ticker TEXT NOT NULL REFERENCES companies(ticker) ON DELETE CASCADE,
                statement_type TEXT NOT NULL,
                period_type TEXT NOT NULL,
                period_end TEXT NOT NULL,
                fields_json TEXT NOT NULL DEFAULT '{}',
                PRIMARY KEY (ticker, statement_type, period_type, period_end)
            );

            CREATE TABLE IF NOT EXISTS price_bars (
                ticker TEXT NOT NULL REFERENCES companies(ticker) ON DELETE CASCADE,
                date TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume INTEGER,
                PRIMARY KEY (ticker, date)
            );

            CREATE TABLE IF NOT EXISTS metrics (
                ticker TEXT NOT NULL REFERENCES companies(ticker) ON DELETE CASCADE,
                key TEXT NOT NULL,
                period_end TEXT NOT NULL,
                period_type TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (ticker, key, period_end, period_type)
            );

            CREATE INDEX IF NOT EXISTS idx_metrics_ticker_key
                ON metrics(ticker, key, period_end);

            CREATE TABLE IF NOT EXISTS rankings (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                definition_json TEXT NOT NULL,
                run_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ranking_results (
                slug TEXT NOT NULL REFERENCES rankings(slug) ON DELETE CASCADE,
                ticker TEXT NOT NULL REFERENCES companies(ticker) ON DELETE CASCADE,
                score REAL NOT NULL,
                rank INTEGER NOT NULL,
                snapshot_json TEXT NOT NULL,
                PRIMARY KEY (slug, ticker)
            );",
        )
        .map_err(storage)?;

        info!("SQLite schema initialized");
        Ok(())
    }

    fn company_exists(conn: &Connection, ticker: &Ticker) -> Result<bool> {
        conn.query_row(
            "SELECT 1 FROM companies WHERE ticker = ?1",
            params![ticker.as_str()],
            |_| Ok(()),
        )
        .optional()
        .map(|row| row.is_some())
        .map_err(storage)
    }

    fn require_company(conn: &Connection, ticker: &Ticker) -> Result<()> {
        if Self::company_exists(conn, ticker)? {
            Ok(())
        } else {
            Err(RondaError::CompanyNotFound(ticker.to_string()))
        }
    }

    fn upsert_metric_in(conn: &Connection, point: &DerivedMetricPoint) -> Result<()> {
        conn.execute(
            "INSERT INTO metrics (ticker, key, period_end, period_type, value)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(ticker, key, period_end, period_type) DO UPDATE SET
                value = excluded.value",
            params![
                point.ticker.as_str(),
                point.key,
                point.period_end,
                point.period_type.as_str(),
                point.value,
            ],
        )
        .map_err(storage)?;
        Ok(())
    }

    fn write_ranking(tx: &Transaction<'_>, ranking: &Ranking, results: &[RankingResult]) -> Result<()> {
        let definition_json = serde_json::to_string(&ranking.definition)?;
        tx.execute(
            "INSERT INTO rankings (slug, name, definition_json, run_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slug) DO UPDATE SET
                name = excluded.name,
                definition_json = excluded.definition_json,
                run_at = excluded.run_at",
            params![ranking.slug, ranking.name, definition_json, ranking.run_at],
        )
        .map_err(storage)?;

        tx.execute(
            "DELETE FROM ranking_results WHERE slug = ?1",
            params![ranking.slug],
        )
        .map_err(storage)?;

        let mut stmt = tx
            .prepare(
                "INSERT INTO ranking_results (slug, ticker, score, rank, snapshot_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(storage)?;
        for result in results {
            let snapshot_json = serde_json::to_string(&result.snapshot)?;
            stmt.execute(params![
                ranking.slug,
                result.ticker.as_str(),
                result.score,
                result.rank,
                snapshot_json,
            ])
            .map_err(storage)?;
        }
        Ok(())
    }
}

impl ObservationStore for SqliteStore {
    fn upsert_company(&self, company: &Company) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO companies (ticker, name, sector, currency, cik)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(ticker) DO UPDATE SET
                name = excluded.name,
                sector = excluded.sector,
                currency = excluded.currency,
                cik = excluded.cik",
            params![
                company.ticker.as_str(),
                company.name,
                company.sector,
                company.currency,
                company.cik,
            ],
        )
        .map_err(storage)?;
        debug!(ticker = %company.ticker, "saved company");
        Ok(())
    }

    fn company(&self, ticker: &Ticker) -> Result<Option<Company>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT ticker, name, sector, currency, cik FROM companies WHERE ticker = ?1",
            params![ticker.as_str()],
            |row| {
                Ok(Company {
                    ticker: Ticker::new(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    sector: row.get(2)?,
                    currency: row.get(3)?,
                    cik: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(storage)
    }

    fn companies(&self) -> Result<Vec<Company>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT ticker, name, sector, currency, cik FROM companies ORDER BY ticker")
            .map_err(storage)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Company {
                    ticker: Ticker::new(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    sector: row.get(2)?,
                    currency: row.get(3)?,
                    cik: row.get(4)?,
                })
            })
            .map_err(storage)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(storage)
    }

    fn delete_company(&self, ticker: &Ticker) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM companies WHERE ticker = ?1",
                params![ticker.as_str()],
            )
            .map_err(storage)?;
        if removed > 0 {
            info!(%ticker, "deleted company");
        }
        Ok(removed > 0)
    }

    fn record_statement(&self, observation: &StatementObservation) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        Self::require_company(&tx, &observation.ticker)?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT fields_json FROM statements
                 WHERE ticker = ?1 AND statement_type = ?2 AND period_type = ?3 AND period_end = ?4",
                params![
                    observation.ticker.as_str(),
                    observation.statement_type.as_str(),
                    observation.period_type.as_str(),
                    observation.period_end,
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage)?;

        let mut fields: FieldMap = match existing {
            Some(json) => serde_json::from_str(&json)?,
            None => FieldMap::new(),
        };
        fields.merge(&observation.fields);
        let fields_json = serde_json::to_string(&fields)?;

        tx.execute(
            "INSERT INTO statements (ticker, statement_type, period_type, period_end, fields_json)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(ticker, statement_type, period_type, period_end) DO UPDATE SET
                fields_json = excluded.fields_json",
            params![
                observation.ticker.as_str(),
                observation.statement_type.as_str(),
                observation.period_type.as_str(),
                observation.period_end,
                fields_json,
            ],
        )
        .map_err(storage)?;
        tx.commit().map_err(storage)?;

        debug!(
            ticker = %observation.ticker,
            statement = %observation.statement_type,
            period = %observation.period_type,
            period_end = %observation.period_end,
            fields = observation.fields.len(),
            "recorded statement"
        );
        Ok(())
    }

    fn statements(
        &self,
        ticker: &Ticker,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<Vec<StatementObservation>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT period_end, fields_json FROM statements
                 WHERE ticker = ?1 AND statement_type = ?2 AND period_type = ?3
                 ORDER BY period_end ASC",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(
                params![ticker.as_str(), statement_type.as_str(), period_type.as_str()],
                |row| Ok((row.get::<_, Date>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;

        rows.into_iter()
            .map(|(period_end, json)| -> Result<StatementObservation> {
                let fields: FieldMap = serde_json::from_str(&json)?;
                Ok(StatementObservation::new(
                    ticker.clone(),
                    statement_type,
                    period_type,
                    period_end,
                    fields,
                ))
            })
            .collect()
    }

    fn record_price_bar(&self, ticker: &Ticker, bar: &PriceBar) -> Result<()> {
        let conn = self.lock()?;
        Self::require_company(&conn, ticker)?;
        conn.execute(
            "INSERT INTO price_bars (ticker, date, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(ticker, date) DO UPDATE SET
                open = excluded.open,
                high = excluded.high,
                low = excluded.low,
                close = excluded.close,
                volume = excluded.volume",
            params![
                ticker.as_str(),
                bar.date,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume,
            ],
        )
        .map_err(storage)?;
        Ok(())
    }

    fn record_price_bars(&self, ticker: &Ticker, bars: &[PriceBar]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        Self::require_company(&tx, ticker)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO price_bars (ticker, date, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(ticker, date) DO UPDATE SET
                        open = excluded.open,
                        high = excluded.high,
                        low = excluded.low,
                        close = excluded.close,
                        volume = excluded.volume",
                )
                .map_err(storage)?;
            for bar in bars {
                stmt.execute(params![
                    ticker.as_str(),
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                ])
                .map_err(storage)?;
            }
        }
        tx.commit().map_err(storage)?;
        debug!(%ticker, bars = bars.len(), "recorded price bars");
        Ok(())
    }

    fn price_bars(&self, ticker: &Ticker) -> Result<Vec<PriceBar>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, open, high, low, close, volume FROM price_bars
                 WHERE ticker = ?1 ORDER BY date ASC",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![ticker.as_str()], |row| {
                Ok(PriceBar {
                    date: row.get(0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                })
            })
            .map_err(storage)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(storage)
    }
}

impl MetricStore for SqliteStore {
    fn upsert_metric(&self, point: &DerivedMetricPoint) -> Result<()> {
        let conn = self.lock()?;
        Self::require_company(&conn, &point.ticker)?;
        Self::upsert_metric_in(&conn, point)
    }

    fn upsert_metrics(&self, points: &[DerivedMetricPoint]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        for point in points {
            Self::require_company(&tx, &point.ticker)?;
            Self::upsert_metric_in(&tx, point)?;
        }
        tx.commit().map_err(storage)?;
        Ok(points.len())
    }

    fn metric_series(
        &self,
        ticker: &Ticker,
        key: &str,
        period_type: Option<MetricPeriod>,
    ) -> Result<Vec<(Date, MetricPeriod, f64)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT period_end, period_type, value FROM metrics
                 WHERE ticker = ?1 AND key = ?2 AND (?3 IS NULL OR period_type = ?3)
                 ORDER BY period_end ASC",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(
                params![ticker.as_str(), key, period_type.map(|p| p.as_str())],
                |row| {
                    Ok((
                        row.get::<_, Date>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                    ))
                },
            )
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;

        let mut out = rows
            .into_iter()
            .map(|(date, period, value)| -> Result<(Date, MetricPeriod, f64)> {
                Ok((date, period.parse::<MetricPeriod>()?, value))
            })
            .collect::<Result<Vec<_>>>()?;
        out.sort_by_key(|(date, period, _)| (*date, *period));
        Ok(out)
    }

    fn latest_metrics(&self, ticker: &Ticker) -> Result<BTreeMap<MetricKey, LatestMetric>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT key, period_end, period_type, value FROM metrics WHERE ticker = ?1",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![ticker.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Date>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;

        let points = rows
            .into_iter()
            .map(|(key, period_end, period, value)| -> Result<DerivedMetricPoint> {
                Ok(DerivedMetricPoint {
                    ticker: ticker.clone(),
                    key,
                    period_end,
                    period_type: period.parse()?,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(latest_by_key(points))
    }
}

impl RankingStore for SqliteStore {
    fn replace_ranking(&self, ranking: &Ranking, results: &[RankingResult]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        // Dropping an uncommitted transaction rolls it back.
        Self::write_ranking(&tx, ranking, results)?;
        tx.commit().map_err(storage)?;
        info!(slug = %ranking.slug, rows = results.len(), "replaced ranking");
        Ok(())
    }

    fn ranking(&self, slug: &str) -> Result<Option<Ranking>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT slug, name, definition_json, run_at FROM rankings WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, chrono::DateTime<chrono::Utc>>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(storage)?;

        row.map(|(slug, name, definition_json, run_at)| -> Result<Ranking> {
            Ok(Ranking {
                slug,
                name,
                definition: serde_json::from_str(&definition_json)?,
                run_at,
            })
        })
        .transpose()
    }

    fn leaderboard(&self, slug: &str) -> Result<Vec<RankingResult>> {
        let conn = self.lock()?;
        let known: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM rankings WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage)?;
        if known.is_none() {
            return Err(RondaError::RankingNotFound(slug.to_string()));
        }

        let mut stmt = conn
            .prepare(
                "SELECT ticker, score, rank, snapshot_json FROM ranking_results
                 WHERE slug = ?1 ORDER BY rank ASC",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![slug], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;

        rows.into_iter()
            .map(|(ticker, score, rank, snapshot_json)| -> Result<RankingResult> {
                Ok(RankingResult {
                    ticker: Ticker::new(ticker),
                    score,
                    rank,
                    snapshot: serde_json::from_str(&snapshot_json)?,
                })
            })
            .collect()
    }
}
