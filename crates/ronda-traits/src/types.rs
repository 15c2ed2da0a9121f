//! Common types used throughout ronda.
//!
//! This module defines the identity anchor ([`Company`]), the raw observation
//! rows written by ingestion adapters ([`StatementObservation`], [`PriceBar`])
//! and the derived rows written by calculators ([`DerivedMetricPoint`]).

use crate::fields::FieldMap;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A derived metric key such as `"Revenue_TTM"`.
///
/// Metric keys are an open vocabulary; see the metric registry in
/// `ronda-metrics` for the keys ronda itself produces.
pub type MetricKey = String;

/// A company ticker symbol.
///
/// Tickers are upper-cased and trimmed on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker, normalizing case and whitespace.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A listed company: the identity every observation and metric hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique ticker symbol.
    pub ticker: Ticker,
    /// Display name.
    pub name: String,
    /// Sector classification.
    pub sector: Option<String>,
    /// Reporting currency.
    pub currency: String,
    /// SEC Central Index Key.
    pub cik: Option<String>,
}

impl Company {
    /// Create a company reporting in USD with no sector or CIK.
    #[must_use]
    pub fn new(ticker: impl Into<Ticker>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            sector: None,
            currency: "USD".to_string(),
            cik: None,
        }
    }

    /// Set the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Set the reporting currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the CIK.
    #[must_use]
    pub fn with_cik(mut self, cik: impl Into<String>) -> Self {
        self.cik = Some(cik.into());
        self
    }
}

/// Financial statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Income statement (durations).
    Income,
    /// Balance sheet (instants).
    Balance,
    /// Cash flow statement (durations).
    Cashflow,
}

impl StatementType {
    /// Short storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "IS",
            Self::Balance => "BS",
            Self::Cashflow => "CF",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = crate::RondaError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "is" | "income" => Ok(Self::Income),
            "bs" | "balance" => Ok(Self::Balance),
            "cf" | "cashflow" | "cash_flow" => Ok(Self::Cashflow),
            other => Err(crate::RondaError::InvalidData(format!(
                "unknown statement type '{other}'"
            ))),
        }
    }
}

/// Reporting period of a statement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum PeriodType {
    /// Fiscal quarter.
    #[default]
    Quarter,
    /// Fiscal year.
    Year,
}

impl PeriodType {
    /// Short storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quarter => "Q",
            Self::Year => "Y",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = crate::RondaError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "q" | "quarter" | "quarterly" => Ok(Self::Quarter),
            "y" | "a" | "year" | "annual" => Ok(Self::Year),
            other => Err(crate::RondaError::InvalidData(format!(
                "unknown period type '{other}'"
            ))),
        }
    }
}

/// Period type of a derived metric point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricPeriod {
    /// Single-quarter value.
    Quarter,
    /// Trailing twelve months.
    Ttm,
    /// Daily snapshot.
    Daily,
}

impl MetricPeriod {
    /// Short storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quarter => "Q",
            Self::Ttm => "TTM",
            Self::Daily => "D",
        }
    }

    /// Preference when two periods of one key share a period end; higher wins.
    #[must_use]
    pub const fn freshness(&self) -> u8 {
        match self {
            Self::Quarter => 0,
            Self::Ttm => 1,
            Self::Daily => 2,
        }
    }
}

impl fmt::Display for MetricPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricPeriod {
    type Err = crate::RondaError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "q" | "quarter" => Ok(Self::Quarter),
            "ttm" => Ok(Self::Ttm),
            "d" | "daily" => Ok(Self::Daily),
            other => Err(crate::RondaError::InvalidData(format!(
                "unknown metric period '{other}'"
            ))),
        }
    }
}

/// One raw statement row: (company, statement type, period type, period end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementObservation {
    /// Owning company.
    pub ticker: Ticker,
    /// Statement kind.
    pub statement_type: StatementType,
    /// Quarter or year.
    pub period_type: PeriodType,
    /// Closing date of the reporting period.
    pub period_end: Date,
    /// Observed line items.
    pub fields: FieldMap,
}

impl StatementObservation {
    /// Create an observation row.
    #[must_use]
    pub fn new(
        ticker: impl Into<Ticker>,
        statement_type: StatementType,
        period_type: PeriodType,
        period_end: Date,
        fields: FieldMap,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            statement_type,
            period_type,
            period_end,
            fields,
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date.
    pub date: Date,
    /// Opening price.
    pub open: Option<f64>,
    /// High.
    pub high: Option<f64>,
    /// Low.
    pub low: Option<f64>,
    /// Closing price.
    pub close: Option<f64>,
    /// Volume.
    pub volume: Option<i64>,
}

impl PriceBar {
    /// A bar carrying only a close.
    #[must_use]
    pub const fn from_close(date: Date, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }

    /// The close, if present and finite.
    #[must_use]
    pub fn finite_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }
}

/// A derived value before it is attached to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Metric key.
    pub key: MetricKey,
    /// Period end the value is stamped with.
    pub period_end: Date,
    /// Quarter, TTM or daily.
    pub period_type: MetricPeriod,
    /// The value.
    pub value: f64,
}

impl MetricPoint {
    /// Create a point.
    #[must_use]
    pub fn new(key: impl Into<MetricKey>, period_end: Date, period_type: MetricPeriod, value: f64) -> Self {
        Self {
            key: key.into(),
            period_end,
            period_type,
            value,
        }
    }

    /// Attach the point to a company.
    #[must_use]
    pub fn for_company(self, ticker: &Ticker) -> DerivedMetricPoint {
        DerivedMetricPoint {
            ticker: ticker.clone(),
            key: self.key,
            period_end: self.period_end,
            period_type: self.period_type,
            value: self.value,
        }
    }
}

/// One stored derived metric row, unique on (ticker, key, period end, period type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetricPoint {
    /// Owning company.
    pub ticker: Ticker,
    /// Metric key.
    pub key: MetricKey,
    /// Period end.
    pub period_end: Date,
    /// Quarter, TTM or daily.
    pub period_type: MetricPeriod,
    /// The value.
    pub value: f64,
}

/// Latest known value of one metric key for a company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestMetric {
    /// The value.
    pub value: f64,
    /// Its period end.
    pub period_end: Date,
    /// Its period type.
    pub period_type: MetricPeriod,
}

/// Reduce metric rows to the latest value per key.
///
/// Latest means greatest period end; on equal period ends the fresher period
/// type wins (daily over TTM over quarter).
pub fn latest_by_key(
    points: impl IntoIterator<Item = DerivedMetricPoint>,
) -> BTreeMap<MetricKey, LatestMetric> {
    let mut out: BTreeMap<MetricKey, LatestMetric> = BTreeMap::new();
    for p in points {
        let candidate = LatestMetric {
            value: p.value,
            period_end: p.period_end,
            period_type: p.period_type,
        };
        match out.get(&p.key) {
            Some(current)
                if (current.period_end, current.period_type.freshness())
                    >= (candidate.period_end, candidate.period_type.freshness()) => {}
            _ => {
                out.insert(p.key, candidate);
            }
        }
    }
    out
}
