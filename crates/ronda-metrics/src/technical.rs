//! Technical indicators from daily closes.
//!
//! Only the most recent bar is evaluated; indicators whose lookback is not
//! yet filled are left out rather than written as partial values.

use crate::resolver::CompanyInputs;
use ndarray::{Array1, ArrayView1, s};
use ronda_traits::{Date, MetricPeriod, MetricPoint, stats::safe_div};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the technical indicator calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalConfig {
    /// Short moving average window (default: 50)
    pub sma_short: usize,

    /// Long moving average window (default: 200)
    pub sma_long: usize,

    /// RSI period; smoothing factor is `1 / period` (default: 14)
    pub rsi_period: usize,

    /// Trailing window for the 52-week high / low (default: 252)
    pub range_window: usize,

    /// Number of daily returns in the volatility window (default: 30)
    pub vol_window: usize,

    /// Trading days per year used to annualize volatility (default: 252)
    pub annualization: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            sma_short: 50,
            sma_long: 200,
            rsi_period: 14,
            range_window: 252,
            vol_window: 30,
            annualization: 252.0,
        }
    }
}

/// Mean of the trailing `window` values.
#[must_use]
pub fn trailing_mean(closes: ArrayView1<'_, f64>, window: usize) -> Option<f64> {
    let n = closes.len();
    if window == 0 || n < window {
        return None;
    }
    closes.slice(s![n - window..]).mean()
}

/// Wilder RSI at the last close.
///
/// Gains and losses are smoothed with `alpha = 1 / period`, seeded with the
/// first price change. A zero average loss yields 100, unless the average
/// gain is zero too, which yields 50.
#[must_use]
pub fn wilder_rsi(closes: ArrayView1<'_, f64>, period: usize) -> Option<f64> {
    if period == 0 || closes.len() < 2 {
        return None;
    }
    let alpha = 1.0 / period as f64;
    let mut deltas = closes.windows(2).into_iter().map(|w| w[1] - w[0]);
    let first = deltas.next()?;
    let (mut gain, mut loss) = (first.max(0.0), (-first).max(0.0));
    for delta in deltas {
        gain = (1.0 - alpha) * gain + alpha * delta.max(0.0);
        loss = (1.0 - alpha) * loss + alpha * (-delta).max(0.0);
    }

    Some(match (gain, loss) {
        (g, l) if l == 0.0 && g == 0.0 => 50.0,
        (_, l) if l == 0.0 => 100.0,
        (g, l) => 100.0 - 100.0 / (1.0 + g / l),
    })
}

/// `last / extreme - 1` against the max and min of the trailing window.
///
/// Each side is undefined on its own when its extreme is zero.
#[must_use]
pub fn range_distances(
    closes: ArrayView1<'_, f64>,
    window: usize,
) -> (Option<f64>, Option<f64>) {
    let n = closes.len();
    if window == 0 || n < window {
        return (None, None);
    }
    let tail = closes.slice(s![n - window..]);
    let last = closes[n - 1];
    let high = tail.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let low = tail.fold(f64::INFINITY, |a, &b| a.min(b));
    (
        safe_div(last, high).map(|r| r - 1.0),
        safe_div(last, low).map(|r| r - 1.0),
    )
}

/// Annualized sample standard deviation of the last `window` simple returns.
#[must_use]
pub fn realized_volatility(
    closes: ArrayView1<'_, f64>,
    window: usize,
    annualization: f64,
) -> Option<f64> {
    let n = closes.len();
    if window < 2 || n < window + 1 {
        return None;
    }
    let tail = closes.slice(s![n - window - 1..]);
    let returns: Option<Array1<f64>> = tail
        .windows(2)
        .into_iter()
        .map(|w| safe_div(w[1], w[0]).map(|r| r - 1.0))
        .collect();
    Some(returns?.std(1.0) * annualization.sqrt())
}

/// Computes SMA, RSI, 52-week range distance and realized volatility.
#[derive(Debug, Clone, Default)]
pub struct TechnicalCalculator {
    config: TechnicalConfig,
}

impl TechnicalCalculator {
    /// Create a new calculator with the given configuration.
    #[must_use]
    pub const fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &TechnicalConfig {
        &self.config
    }

    /// Indicators at the last of the given ascending `(date, close)` points.
    #[must_use]
    pub fn compute_closes(&self, points: &[(Date, f64)]) -> Vec<MetricPoint> {
        let Some(&(date, last)) = points.last() else {
            return Vec::new();
        };
        let closes: Array1<f64> = points.iter().map(|&(_, c)| c).collect();
        let view = closes.view();
        let cfg = &self.config;
        let mut out = Vec::new();
        let mut put = |key: &str, value: Option<f64>| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                out.push(MetricPoint::new(key, date, MetricPeriod::Daily, v));
            }
        };

        put("SMA_50", trailing_mean(view, cfg.sma_short));
        put("SMA_200", trailing_mean(view, cfg.sma_long));
        put("RSI_14", wilder_rsi(view, cfg.rsi_period));
        let (to_high, to_low) = range_distances(view, cfg.range_window);
        put("DistTo52wHigh", to_high);
        put("DistTo52wLow", to_low);
        put(
            "Vol_30d",
            realized_volatility(view, cfg.vol_window, cfg.annualization),
        );
        put("Price", Some(last));
        out
    }

    /// Indicators for one company's price bars.
    #[must_use]
    pub fn compute(&self, inputs: &CompanyInputs) -> Vec<MetricPoint> {
        let closes = inputs.closes();
        let points = self.compute_closes(closes.points());
        debug!(
            ticker = %inputs.ticker,
            closes = closes.len(),
            points = points.len(),
            "computed technicals"
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dated(closes: &[f64]) -> Vec<(Date, f64)> {
        let start = Date::from_ymd_opt(2023, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (start + chrono::Days::new(i as u64), c))
            .collect()
    }

    fn get(points: &[MetricPoint], key: &str) -> Option<f64> {
        points.iter().find(|p| p.key == key).map(|p| p.value)
    }

    #[test]
    fn test_sma_needs_full_window() {
        let closes: Array1<f64> = (1..=49_i32).map(f64::from).collect();
        assert_eq!(trailing_mean(closes.view(), 50), None);
        let closes: Array1<f64> = (1..=50_i32).map(f64::from).collect();
        assert_relative_eq!(trailing_mean(closes.view(), 50).unwrap(), 25.5);
    }

    #[test]
    fn test_rsi_bounds_and_boundaries() {
        let rising = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(wilder_rsi(rising.view(), 14), Some(100.0));

        let flat = Array1::from(vec![5.0; 20]);
        assert_eq!(wilder_rsi(flat.view(), 14), Some(50.0));

        let falling = Array1::from(vec![4.0, 3.0, 2.0, 1.0]);
        assert_relative_eq!(wilder_rsi(falling.view(), 14).unwrap(), 0.0);

        let single = Array1::from(vec![5.0]);
        assert_eq!(wilder_rsi(single.view(), 14), None);

        let choppy: Array1<f64> = (0..200_i32)
            .map(|i| 100.0 + (f64::from(i) * 0.7).sin() * 5.0)
            .collect();
        let rsi = wilder_rsi(choppy.view(), 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi));
    }

    #[test]
    fn test_rsi_seeded_with_first_change() {
        // gain: 1.0 then 0.75 * 1.0 + 0.25 * 0 = 0.75
        // loss: 0.0 then 0.75 * 0.0 + 0.25 * 1 = 0.25
        let closes = Array1::from(vec![10.0, 11.0, 10.0]);
        assert_relative_eq!(wilder_rsi(closes.view(), 4).unwrap(), 75.0);
    }

    #[test]
    fn test_range_distances() {
        let mut closes: Vec<f64> = vec![80.0; 251];
        closes[10] = 120.0;
        closes.push(100.0);
        let closes = Array1::from(closes);
        let (high, low) = range_distances(closes.view(), 252);
        assert_relative_eq!(high.unwrap(), 100.0 / 120.0 - 1.0);
        assert_relative_eq!(low.unwrap(), 0.25);
        assert_eq!(range_distances(closes.slice(s![1..]), 252), (None, None));
    }

    #[test]
    fn test_zero_low_keeps_distance_to_high() {
        let mut raw: Vec<f64> = vec![50.0; 251];
        raw[3] = 0.0;
        raw.push(40.0);
        let closes = Array1::from(raw.clone());
        let (high, low) = range_distances(closes.view(), 252);
        assert_relative_eq!(high.unwrap(), 40.0 / 50.0 - 1.0);
        assert_eq!(low, None);

        let points = TechnicalCalculator::default().compute_closes(&dated(&raw));
        assert_relative_eq!(get(&points, "DistTo52wHigh").unwrap(), -0.2);
        assert_eq!(get(&points, "DistTo52wLow"), None);
    }

    #[test]
    fn test_volatility_of_constant_returns_is_zero() {
        let closes: Array1<f64> = (0..31).map(|i| 1.01_f64.powi(i)).collect();
        assert_relative_eq!(
            realized_volatility(closes.view(), 30, 252.0).unwrap(),
            0.0,
            epsilon = 1e-12
        );
        assert_eq!(realized_volatility(closes.slice(s![1..]), 30, 252.0), None);
    }

    #[test]
    fn test_volatility_alternating_returns() {
        // returns alternate +10% / -10%: sample std over 30 returns
        let mut closes = vec![100.0];
        for i in 0..30 {
            let last = closes[closes.len() - 1];
            closes.push(if i % 2 == 0 { last * 1.1 } else { last * 0.9 });
        }
        let closes = Array1::from(closes);
        let expected = (0.01_f64 * 30.0 / 29.0).sqrt() * 252.0_f64.sqrt();
        assert_relative_eq!(
            realized_volatility(closes.view(), 30, 252.0).unwrap(),
            expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_short_history_writes_only_what_is_defined() {
        let calc = TechnicalCalculator::default();
        let points = calc.compute_closes(&dated(&[10.0, 11.0, 12.0]));
        let keys: Vec<&str> = points.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["RSI_14", "Price"]);
        assert!(points.iter().all(|p| p.period_type == MetricPeriod::Daily));
        assert_eq!(get(&points, "Price"), Some(12.0));
    }

    #[test]
    fn test_full_history_writes_every_indicator_at_last_bar() {
        let closes: Vec<f64> = (0..300_i32).map(|i| 100.0 + f64::from(i % 7)).collect();
        let dated = dated(&closes);
        let points = TechnicalCalculator::default().compute_closes(&dated);
        assert_eq!(points.len(), 7);
        let last = dated.last().unwrap().0;
        assert!(points.iter().all(|p| p.period_end == last));
        let tail: f64 = closes[250..].iter().sum::<f64>() / 50.0;
        assert_relative_eq!(get(&points, "SMA_50").unwrap(), tail);
    }

    #[test]
    fn test_empty_input() {
        assert!(TechnicalCalculator::default().compute_closes(&[]).is_empty());
    }
}
