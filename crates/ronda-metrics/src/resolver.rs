//! Series resolution: raw statement rows to clean `(date, value)` sequences.
//!
//! A series is resolved by evaluating an ordered alias list against each
//! statement row. Malformed values (non-numeric text, NaN, infinities) are
//! dropped here and never reach a calculator.
//!
//! # Example
//!
//! ```
//! use ronda_metrics::resolver::first_alias;
//! use ronda_traits::FieldMap;
//!
//! let fields = FieldMap::new().with("Revenues", 42.0).unwrap();
//! let hit = first_alias(&["Revenue", "Revenues"], |name| fields.get(name));
//! assert_eq!(hit, Some(("Revenues", 42.0)));
//! ```

use ronda_traits::{
    Date, ObservationStore, PeriodType, PriceBar, RawValue, Result, StatementObservation,
    StatementType, Ticker,
};
use tracing::{debug, trace};

/// Evaluate an ordered alias list against a lookup.
///
/// Returns the first alias whose value coerces to a finite float, with that
/// value. Aliases that are present but malformed are skipped.
pub fn first_alias<'a, 'v, F>(aliases: &[&'a str], lookup: F) -> Option<(&'a str, f64)>
where
    F: Fn(&str) -> Option<&'v RawValue>,
{
    aliases.iter().find_map(|alias| {
        let raw = lookup(alias)?;
        match raw.to_finite() {
            Some(v) => Some((*alias, v)),
            None => {
                debug!(field = *alias, value = ?raw, "dropping malformed value");
                None
            }
        }
    })
}

/// An ascending `(date, value)` series with no gaps recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<(Date, f64)>,
}

impl Series {
    /// Build from points, sorting by date.
    #[must_use]
    pub fn new(mut points: Vec<(Date, f64)>) -> Self {
        points.sort_by_key(|(d, _)| *d);
        Self { points }
    }

    /// The points in ascending date order.
    #[must_use]
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent point.
    #[must_use]
    pub fn last(&self) -> Option<(Date, f64)> {
        self.points.last().copied()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.points.iter().map(|(d, _)| *d)
    }

    /// Value at exactly `date`.
    #[must_use]
    pub fn at(&self, date: Date) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Most recent point with date <= `date`.
    #[must_use]
    pub fn as_of(&self, date: Date) -> Option<(Date, f64)> {
        value_as_of(&self.points, date)
    }
}

/// Most recent point at or before `date` in an ascending series.
///
/// This is the single as-of join used for shares, cash, debt and prices.
#[must_use]
pub fn value_as_of(points: &[(Date, f64)], date: Date) -> Option<(Date, f64)> {
    // Index of the first point strictly after `date`.
    let idx = points.partition_point(|(d, _)| *d <= date);
    idx.checked_sub(1).map(|i| points[i])
}

/// A series with one slot per stored statement row.
///
/// Slots where no alias resolves hold `None`, so a missing quarter stays
/// visible to window computations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    slots: Vec<(Date, Option<f64>)>,
}

impl AlignedSeries {
    /// Build from ascending slots.
    #[must_use]
    pub fn new(mut slots: Vec<(Date, Option<f64>)>) -> Self {
        slots.sort_by_key(|(d, _)| *d);
        Self { slots }
    }

    /// The slots.
    #[must_use]
    pub fn slots(&self) -> &[(Date, Option<f64>)] {
        &self.slots
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of populated slots.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.slots.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Drop empty slots.
    #[must_use]
    pub fn dense(&self) -> Series {
        Series {
            points: self
                .slots
                .iter()
                .filter_map(|(d, v)| v.map(|v| (*d, v)))
                .collect(),
        }
    }
}

impl From<Series> for AlignedSeries {
    fn from(series: Series) -> Self {
        Self {
            slots: series.points.into_iter().map(|(d, v)| (d, Some(v))).collect(),
        }
    }
}

/// Resolve aligned slots over already-loaded rows.
#[must_use]
pub fn resolve_rows_aligned(rows: &[StatementObservation], aliases: &[&str]) -> AlignedSeries {
    let slots = rows
        .iter()
        .map(|row| {
            let value = first_alias(aliases, |name| row.fields.get(name)).map(|(alias, v)| {
                trace!(ticker = %row.ticker, period_end = %row.period_end, alias, "resolved");
                v
            });
            (row.period_end, value)
        })
        .collect();
    AlignedSeries::new(slots)
}

/// Resolve a dense series over already-loaded rows.
#[must_use]
pub fn resolve_rows(rows: &[StatementObservation], aliases: &[&str]) -> Series {
    resolve_rows_aligned(rows, aliases).dense()
}

/// Finite closes from price bars, ascending.
#[must_use]
pub fn closes(bars: &[PriceBar]) -> Series {
    let mut dropped = 0usize;
    let points = bars
        .iter()
        .filter_map(|bar| {
            let close = bar.finite_close();
            if close.is_none() {
                dropped += 1;
            }
            close.map(|c| (bar.date, c))
        })
        .collect();
    if dropped > 0 {
        debug!(dropped, "dropping price bars without a finite close");
    }
    Series::new(points)
}

/// Resolve one field series for a company straight from a store.
///
/// # Errors
///
/// Propagates store errors.
pub fn resolve(
    store: &(impl ObservationStore + ?Sized),
    ticker: &Ticker,
    statement_type: StatementType,
    period_type: PeriodType,
    aliases: &[&str],
) -> Result<Series> {
    let rows = store.statements(ticker, statement_type, period_type)?;
    Ok(resolve_rows(&rows, aliases))
}

/// All raw inputs for one company, loaded once per recomputation.
#[derive(Debug, Clone)]
pub struct CompanyInputs {
    /// The company.
    pub ticker: Ticker,
    /// Income statement rows, ascending.
    pub income: Vec<StatementObservation>,
    /// Balance sheet rows, ascending.
    pub balance: Vec<StatementObservation>,
    /// Cash-flow rows, ascending.
    pub cashflow: Vec<StatementObservation>,
    /// Price bars, ascending.
    pub bars: Vec<PriceBar>,
}

impl CompanyInputs {
    /// Load a company's rows of one period type and its price bars.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn load(
        store: &(impl ObservationStore + ?Sized),
        ticker: &Ticker,
        period_type: PeriodType,
    ) -> Result<Self> {
        Ok(Self {
            ticker: ticker.clone(),
            income: store.statements(ticker, StatementType::Income, period_type)?,
            balance: store.statements(ticker, StatementType::Balance, period_type)?,
            cashflow: store.statements(ticker, StatementType::Cashflow, period_type)?,
            bars: store.price_bars(ticker)?,
        })
    }

    /// Rows for one statement type.
    #[must_use]
    pub fn rows(&self, statement_type: StatementType) -> &[StatementObservation] {
        match statement_type {
            StatementType::Income => &self.income,
            StatementType::Balance => &self.balance,
            StatementType::Cashflow => &self.cashflow,
        }
    }

    /// Dense series for one statement type.
    #[must_use]
    pub fn series(&self, statement_type: StatementType, aliases: &[&str]) -> Series {
        resolve_rows(self.rows(statement_type), aliases)
    }

    /// Aligned series for one statement type.
    #[must_use]
    pub fn aligned(&self, statement_type: StatementType, aliases: &[&str]) -> AlignedSeries {
        resolve_rows_aligned(self.rows(statement_type), aliases)
    }

    /// Finite closes.
    #[must_use]
    pub fn closes(&self) -> Series {
        closes(&self.bars)
    }
}
