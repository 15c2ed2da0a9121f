//! Polars DataFrame conversions.
//!
//! Price bars arrive as tabular files (OHLCV with a date column) and query
//! results are displayed as frames. The helpers here keep polars at the edge
//! of the engine; calculators work on plain vectors.

use crate::{
    error::{Result, RondaError},
    types::{Date, LatestMetric, MetricKey, MetricPeriod, PriceBar},
};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of polars `Date`.
const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Find a column by case-insensitive name.
fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|c| c.name().as_str().eq_ignore_ascii_case(name))
}

/// Read a column of dates, accepting polars `Date` or `YYYY-MM-DD` strings.
fn date_values(column: &Column) -> Result<Vec<Option<Date>>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Date => Ok(series
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(|days| Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS))
            })
            .collect()),
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|s| s.and_then(|s| Date::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
            .collect()),
        other => Err(RondaError::InvalidData(format!(
            "column '{}' has type {other}, expected a date",
            column.name()
        ))),
    }
}

/// Read a column as f64, nulling anything that does not cast.
fn f64_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let cast = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Convert an OHLCV frame into price bars.
///
/// `date` and `close` columns are required (matched case-insensitively);
/// `open`, `high`, `low` and `volume` are optional. Rows without a parseable
/// date or a finite close are dropped.
///
/// # Errors
///
/// Returns [`RondaError::InvalidData`] if a required column is missing.
///
/// # Example
///
/// ```
/// use polars::prelude::*;
/// use ronda_traits::frame::price_bars_from_frame;
///
/// let df = df! {
///     "Date" => &["2024-01-02", "2024-01-03", "bad"],
///     "Close" => &[10.0, 11.0, 12.0],
/// }.unwrap();
///
/// let bars = price_bars_from_frame(&df).unwrap();
/// assert_eq!(bars.len(), 2);
/// ```
pub fn price_bars_from_frame(df: &DataFrame) -> Result<Vec<PriceBar>> {
    let date_col = find_column(df, "date")
        .ok_or_else(|| RondaError::InvalidData("price frame has no 'date' column".into()))?;
    let close_col = find_column(df, "close")
        .ok_or_else(|| RondaError::InvalidData("price frame has no 'close' column".into()))?;

    let dates = date_values(date_col)?;
    let closes = f64_values(close_col)?;
    let optional = |name: &str| -> Result<Vec<Option<f64>>> {
        find_column(df, name).map_or_else(|| Ok(vec![None; df.height()]), f64_values)
    };
    let opens = optional("open")?;
    let highs = optional("high")?;
    let lows = optional("low")?;
    let volumes = optional("volume")?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(date), Some(close)) = (dates[i], closes[i].filter(|c| c.is_finite())) else {
            continue;
        };
        bars.push(PriceBar {
            date,
            open: opens[i].filter(|v| v.is_finite()),
            high: highs[i].filter(|v| v.is_finite()),
            low: lows[i].filter(|v| v.is_finite()),
            close: Some(close),
            volume: volumes[i].filter(|v| v.is_finite()).map(|v| v as i64),
        });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Read a CSV file of OHLCV bars.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or lacks required columns.
pub fn read_price_csv(path: &std::path::Path) -> Result<Vec<PriceBar>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    price_bars_from_frame(&df)
}

/// A metric series as a `date | period | value` frame.
///
/// # Errors
///
/// Returns an error if the frame cannot be built.
pub fn series_frame(points: &[(Date, MetricPeriod, f64)]) -> Result<DataFrame> {
    let dates: Vec<String> = points.iter().map(|(d, _, _)| d.to_string()).collect();
    let periods: Vec<&str> = points.iter().map(|(_, p, _)| p.as_str()).collect();
    let values: Vec<f64> = points.iter().map(|(_, _, v)| *v).collect();
    Ok(df! {
        "date" => dates,
        "period" => periods,
        "value" => values,
    }?)
}

/// Latest metrics as a `metric | date | period | value` frame.
///
/// # Errors
///
/// Returns an error if the frame cannot be built.
pub fn latest_frame(latest: &BTreeMap<MetricKey, LatestMetric>) -> Result<DataFrame> {
    let keys: Vec<&str> = latest.keys().map(String::as_str).collect();
    let dates: Vec<String> = latest.values().map(|m| m.period_end.to_string()).collect();
    let periods: Vec<&str> = latest.values().map(|m| m.period_type.as_str()).collect();
    let values: Vec<f64> = latest.values().map(|m| m.value).collect();
    Ok(df! {
        "metric" => keys,
        "date" => dates,
        "period" => periods,
        "value" => values,
    }?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_price_bars_from_string_dates() {
        let df = df! {
            "date" => &["2024-01-03", "2024-01-02", "2024-01-04"],
            "open" => &[1.0, 2.0, 3.0],
            "close" => &[Some(10.0), Some(9.0), None],
            "volume" => &[100.0, 200.0, 300.0],
        }
        .unwrap();

        let bars = price_bars_from_frame(&df).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[0].close, Some(9.0));
        assert_eq!(bars[0].volume, Some(200));
        assert_eq!(bars[1].open, Some(1.0));
        assert_eq!(bars[1].high, None);
    }

    #[test]
    fn test_price_bars_from_date_dtype() {
        let dates = Series::new("Date".into(), &[d(2024, 1, 2), d(2024, 1, 3)]);
        let closes = Series::new("CLOSE".into(), &[1.5, 2.5]);
        let df = DataFrame::new(vec![dates.into(), closes.into()]).unwrap();

        let bars = price_bars_from_frame(&df).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, d(2024, 1, 3));
    }

    #[test]
    fn test_price_bars_missing_close_column() {
        let df = df! { "date" => &["2024-01-02"], "open" => &[1.0] }.unwrap();
        assert!(price_bars_from_frame(&df).is_err());
    }

    #[test]
    fn test_series_frame_shape() {
        let df = series_frame(&[
            (d(2024, 3, 31), MetricPeriod::Ttm, 1.0),
            (d(2024, 6, 30), MetricPeriod::Ttm, 2.0),
        ])
        .unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }
}
