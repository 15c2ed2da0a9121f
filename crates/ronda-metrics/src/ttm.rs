//! Trailing-twelve-month sums, growth rates and margins.
//!
//! TTM values are strict: a window is summed only when every slot in it is
//! populated. One point is produced per historical quarter.

use crate::{
    aliases::*,
    resolver::{AlignedSeries, CompanyInputs, Series},
};
use ronda_traits::{
    Date, MetricPeriod, MetricPoint, StatementType,
    stats::{pct_change, safe_div},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration for the TTM calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtmConfig {
    /// Quarters per trailing window (default: 4)
    pub window: usize,

    /// Maximum days between the first and last period end of a window
    /// (default: 300). A wider window means a quarter is missing from the
    /// store altogether. `None` disables the check.
    pub max_window_span_days: Option<i64>,

    /// Populated direct EBITDA quarters required before the
    /// OperatingIncome + D&A fallback is skipped (default: 4)
    pub ebitda_min_points: usize,

    /// Largest gap, in days, between a lagged slot's actual period end and
    /// the one expected `lag` quarters back (default: 45). Beyond it growth
    /// is undefined because a quarter is missing. `None` disables the check.
    pub max_lag_drift_days: Option<i64>,
}

impl Default for TtmConfig {
    fn default() -> Self {
        Self {
            window: 4,
            max_window_span_days: Some(300),
            ebitda_min_points: 4,
            max_lag_drift_days: Some(45),
        }
    }
}

/// Line items that get a TTM series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TtmBase {
    /// Revenue.
    Revenue,
    /// Net income.
    NetIncome,
    /// Gross profit.
    GrossProfit,
    /// Operating income.
    OperatingIncome,
    /// SG&A.
    Sga,
    /// R&D.
    Rnd,
    /// Depreciation and amortization.
    Da,
    /// EBITDA, direct or derived.
    Ebitda,
    /// Cash from operations.
    Cfo,
    /// Capital expenditure.
    CapEx,
}

impl TtmBase {
    /// Every base, in output order.
    pub const ALL: [Self; 10] = [
        Self::Revenue,
        Self::NetIncome,
        Self::GrossProfit,
        Self::OperatingIncome,
        Self::Sga,
        Self::Rnd,
        Self::Da,
        Self::Ebitda,
        Self::Cfo,
        Self::CapEx,
    ];

    /// Metric key stem.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::NetIncome => "NetIncome",
            Self::GrossProfit => "GrossProfit",
            Self::OperatingIncome => "OperatingIncome",
            Self::Sga => "SGA",
            Self::Rnd => "RnD",
            Self::Da => "DA",
            Self::Ebitda => "EBITDA",
            Self::Cfo => "CFO",
            Self::CapEx => "CapEx",
        }
    }

    /// `{name}_TTM`.
    #[must_use]
    pub fn ttm_key(&self) -> String {
        format!("{}_TTM", self.name())
    }

    /// Whether QoQ / YoY growth is produced for this base.
    #[must_use]
    pub const fn has_growth(&self) -> bool {
        matches!(self, Self::Revenue | Self::NetIncome)
    }
}

/// TTM value at slot `idx`, or `None` if any slot in the window is empty,
/// the window does not fit, or its span is too wide.
#[must_use]
pub fn ttm_at(slots: &[(Date, Option<f64>)], idx: usize, config: &TtmConfig) -> Option<f64> {
    let window = config.window.max(1);
    if idx >= slots.len() || idx + 1 < window {
        return None;
    }
    let span = &slots[idx + 1 - window..=idx];
    if let Some(max_days) = config.max_window_span_days {
        let days = (span[window - 1].0 - span[0].0).num_days();
        if days > max_days {
            return None;
        }
    }
    span.iter().map(|(_, v)| *v).sum::<Option<f64>>()
}

/// TTM at every slot of an aligned quarterly series.
#[must_use]
pub fn rolling_ttm(series: &AlignedSeries, config: &TtmConfig) -> Vec<(Date, Option<f64>)> {
    let slots = series.slots();
    (0..slots.len())
        .map(|i| (slots[i].0, ttm_at(slots, i, config)))
        .collect()
}

/// Average days per quarter.
const DAYS_PER_QUARTER: f64 = 365.25 / 4.0;

/// `v(i) / v(i - lag) - 1` at every slot.
///
/// The slot `lag` positions back only counts when its period end lies
/// about `lag` quarters earlier, within `max_drift_days`. A quarter absent
/// from the store would otherwise pair the wrong periods.
#[must_use]
pub fn lagged_growth(
    slots: &[(Date, Option<f64>)],
    lag: usize,
    max_drift_days: Option<i64>,
) -> Vec<(Date, Option<f64>)> {
    slots
        .iter()
        .enumerate()
        .map(|(i, (date, current))| {
            let growth = i
                .checked_sub(lag)
                .filter(|_| lag > 0)
                .filter(|&j| {
                    max_drift_days.is_none_or(|max| {
                        let days = (*date - slots[j].0).num_days();
                        let expected = (lag as f64 * DAYS_PER_QUARTER).round() as i64;
                        (days - expected).abs() <= max
                    })
                })
                .and_then(|j| slots[j].1)
                .zip(*current)
                .and_then(|(previous, current)| pct_change(current, previous));
            (*date, growth)
        })
        .collect()
}

/// Quarterly EBITDA.
///
/// The direct series is used when it has at least `min_points` populated
/// quarters. Otherwise EBITDA is OperatingIncome + D&A over the union of both
/// date sets, with a missing term counted as zero.
#[must_use]
pub fn ebitda_quarters(
    direct: AlignedSeries,
    operating_income: &Series,
    da: &Series,
    min_points: usize,
) -> AlignedSeries {
    if direct.populated() >= min_points {
        return direct;
    }
    let mut union: BTreeMap<Date, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for (d, v) in operating_income.points() {
        union.entry(*d).or_default().0 = Some(*v);
    }
    for (d, v) in da.points() {
        union.entry(*d).or_default().1 = Some(*v);
    }
    debug!(
        direct = direct.populated(),
        derived = union.len(),
        "deriving EBITDA from operating income and D&A"
    );
    AlignedSeries::new(
        union
            .into_iter()
            .map(|(d, (op, da))| (d, Some(op.unwrap_or(0.0) + da.unwrap_or(0.0))))
            .collect(),
    )
}

/// Dense TTM series per base, for the valuation calculator.
#[derive(Debug, Clone, Default)]
pub struct TtmTable {
    series: BTreeMap<TtmBase, Series>,
    fcf: Series,
}

impl TtmTable {
    /// The TTM series of a base.
    #[must_use]
    pub fn series(&self, base: TtmBase) -> Option<&Series> {
        self.series.get(&base)
    }

    /// TTM value of a base at exactly `date`.
    #[must_use]
    pub fn at(&self, base: TtmBase, date: Date) -> Option<f64> {
        self.series.get(&base).and_then(|s| s.at(date))
    }

    /// FCF TTM at exactly `date`.
    #[must_use]
    pub fn fcf_at(&self, date: Date) -> Option<f64> {
        self.fcf.at(date)
    }

    /// FCF TTM series.
    #[must_use]
    pub const fn fcf(&self) -> &Series {
        &self.fcf
    }
}

/// Result of a TTM pass over one company.
#[derive(Debug, Clone, Default)]
pub struct TtmOutput {
    /// Derived points to persist.
    pub points: Vec<MetricPoint>,
    /// TTM series for downstream calculators.
    pub table: TtmTable,
}

/// Computes TTM sums, growth and margins for one company.
///
/// # Example
///
/// ```ignore
/// use ronda_metrics::ttm::TtmCalculator;
///
/// let output = TtmCalculator::default().compute(&inputs);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TtmCalculator {
    config: TtmConfig,
}

impl TtmCalculator {
    /// Create a new calculator with the given configuration.
    #[must_use]
    pub const fn new(config: TtmConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &TtmConfig {
        &self.config
    }

    /// Aligned quarterly series for a base.
    #[must_use]
    pub fn quarterly(&self, inputs: &CompanyInputs, base: TtmBase) -> AlignedSeries {
        let income = |aliases: &[&str]| inputs.aligned(StatementType::Income, aliases);
        let cashflow = |aliases: &[&str]| inputs.aligned(StatementType::Cashflow, aliases);
        match base {
            TtmBase::Revenue => income(REVENUE_ALIASES),
            TtmBase::NetIncome => income(NET_INCOME_ALIASES),
            TtmBase::GrossProfit => income(GROSS_PROFIT_ALIASES),
            TtmBase::OperatingIncome => income(OPERATING_INCOME_ALIASES),
            TtmBase::Sga => income(SGA_ALIASES),
            TtmBase::Rnd => income(RND_ALIASES),
            TtmBase::Da => {
                let from_income = income(DA_ALIASES);
                if from_income.populated() > 0 {
                    from_income
                } else {
                    cashflow(DA_ALIASES)
                }
            }
            TtmBase::Ebitda => ebitda_quarters(
                income(EBITDA_ALIASES),
                &income(OPERATING_INCOME_ALIASES).dense(),
                &self.quarterly(inputs, TtmBase::Da).dense(),
                self.config.ebitda_min_points,
            ),
            TtmBase::Cfo => cashflow(CFO_ALIASES),
            TtmBase::CapEx => cashflow(CAPEX_ALIASES),
        }
    }

    /// Run the full TTM pass.
    #[must_use]
    pub fn compute(&self, inputs: &CompanyInputs) -> TtmOutput {
        let mut points = Vec::new();
        let mut table = TtmTable::default();
        let mut quarterly: BTreeMap<TtmBase, Series> = BTreeMap::new();

        for base in TtmBase::ALL {
            let aligned = self.quarterly(inputs, base);
            let ttm = rolling_ttm(&aligned, &self.config);
            let ttm_key = base.ttm_key();
            push_defined(&mut points, &ttm_key, MetricPeriod::Ttm, &ttm);

            if base.has_growth() {
                let name = base.name();
                let slots = aligned.slots();
                push_defined(
                    &mut points,
                    &format!("{name}_QoQ"),
                    MetricPeriod::Quarter,
                    &lagged_growth(slots, 1, self.config.max_lag_drift_days),
                );
                push_defined(
                    &mut points,
                    &format!("{name}_YoY_Q"),
                    MetricPeriod::Quarter,
                    &lagged_growth(slots, 4, self.config.max_lag_drift_days),
                );
                push_defined(
                    &mut points,
                    &format!("{name}_YoY"),
                    MetricPeriod::Ttm,
                    &lagged_growth(&ttm, 4, self.config.max_lag_drift_days),
                );
            }

            quarterly.insert(base, aligned.dense());
            table
                .series
                .insert(base, AlignedSeries::new(ttm).dense());
        }

        // FCF joins the two cash-flow TTMs on identical period ends.
        let fcf: Vec<(Date, f64)> = match (table.series(TtmBase::Cfo), table.series(TtmBase::CapEx)) {
            (Some(cfo), Some(capex)) => cfo
                .points()
                .iter()
                .filter_map(|(d, c)| capex.at(*d).map(|x| (*d, c - x)))
                .collect(),
            _ => Vec::new(),
        };
        table.fcf = Series::new(fcf);
        for (d, v) in table.fcf.points() {
            points.push(MetricPoint::new("FCF_TTM", *d, MetricPeriod::Ttm, *v));
        }

        let empty = Series::default();
        let q = |base: TtmBase| quarterly.get(&base).unwrap_or(&empty);
        let t = |base: TtmBase| table.series(base).unwrap_or(&empty);

        for (key, numerator) in [
            ("GrossMargin", TtmBase::GrossProfit),
            ("OpMargin", TtmBase::OperatingIncome),
            ("NetMargin", TtmBase::NetIncome),
        ] {
            points.extend(ratio_points(key, q(numerator), q(TtmBase::Revenue), MetricPeriod::Quarter));
        }
        for (key, numerator) in [
            ("GrossMargin_TTM", t(TtmBase::GrossProfit)),
            ("OpMargin_TTM", t(TtmBase::OperatingIncome)),
            ("NetMargin_TTM", t(TtmBase::NetIncome)),
            ("EBITDAMargin_TTM", t(TtmBase::Ebitda)),
            ("FCF_Margin_TTM", table.fcf()),
        ] {
            points.extend(ratio_points(key, numerator, t(TtmBase::Revenue), MetricPeriod::Ttm));
        }

        debug!(ticker = %inputs.ticker, points = points.len(), "computed TTM metrics");
        TtmOutput { points, table }
    }
}

fn push_defined(
    points: &mut Vec<MetricPoint>,
    key: &str,
    period: MetricPeriod,
    values: &[(Date, Option<f64>)],
) {
    points.extend(
        values
            .iter()
            .filter_map(|(d, v)| v.map(|v| MetricPoint::new(key, *d, period, v))),
    );
}

/// `numerator / denominator` on matching dates; undefined on a zero or
/// missing denominator.
fn ratio_points(
    key: &str,
    numerator: &Series,
    denominator: &Series,
    period: MetricPeriod,
) -> Vec<MetricPoint> {
    numerator
        .points()
        .iter()
        .filter_map(|(d, n)| {
            let ratio = safe_div(*n, denominator.at(*d)?)?;
            Some(MetricPoint::new(key, *d, period, ratio))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::{FieldMap, PeriodType, StatementObservation, Ticker, fields};

    fn quarter_ends(n: usize) -> Vec<Date> {
        let mut out = Vec::new();
        let mut year = 2020;
        let mut q = 0;
        while out.len() < n {
            let (m, d) = [(3, 31), (6, 30), (9, 30), (12, 31)][q];
            out.push(Date::from_ymd_opt(year, m, d).unwrap());
            q += 1;
            if q == 4 {
                q = 0;
                year += 1;
            }
        }
        out
    }

    fn aligned(values: &[Option<f64>]) -> AlignedSeries {
        AlignedSeries::new(
            quarter_ends(values.len())
                .into_iter()
                .zip(values.iter().copied())
                .collect(),
        )
    }

    fn inputs(rows: Vec<(StatementType, Date, FieldMap)>) -> CompanyInputs {
        let mut inputs = CompanyInputs {
            ticker: Ticker::new("TST"),
            income: Vec::new(),
            balance: Vec::new(),
            cashflow: Vec::new(),
            bars: Vec::new(),
        };
        for (st, end, fields) in rows {
            let obs = StatementObservation::new("TST", st, PeriodType::Quarter, end, fields);
            match st {
                StatementType::Income => inputs.income.push(obs),
                StatementType::Balance => inputs.balance.push(obs),
                StatementType::Cashflow => inputs.cashflow.push(obs),
            }
        }
        inputs
    }

    fn value(points: &[MetricPoint], key: &str, date: Date) -> Option<f64> {
        points
            .iter()
            .find(|p| p.key == key && p.period_end == date)
            .map(|p| p.value)
    }

    #[test]
    fn test_ttm_undefined_with_fewer_than_four_points() {
        let config = TtmConfig::default();
        for n in 0..4 {
            let series = aligned(&vec![Some(1.0); n]);
            assert!(rolling_ttm(&series, &config).iter().all(|(_, v)| v.is_none()));
        }
        // Four slots but only three populated.
        let series = aligned(&[Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), None]);
        let ttm = rolling_ttm(&series, &config);
        assert!(ttm.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_ttm_exact_sum_of_last_four() {
        let values: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();
        let ttm = rolling_ttm(&aligned(&values), &TtmConfig::default());
        for (i, (_, v)) in ttm.iter().enumerate() {
            if i < 3 {
                assert!(v.is_none());
            } else {
                let expected: f64 = ((i - 2)..=(i + 1)).map(|x| x as f64).sum();
                assert_eq!(*v, Some(expected));
            }
        }
    }

    #[test]
    fn test_single_gap_voids_window() {
        let values = [Some(1.0), Some(1.0), Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        let ttm = rolling_ttm(&aligned(&values), &TtmConfig::default());
        assert_eq!(ttm[3].1, Some(4.0));
        for slot in &ttm[4..8] {
            assert_eq!(slot.1, None);
        }
        assert_eq!(ttm[8].1, Some(4.0));
    }

    #[test]
    fn test_wide_window_span_voids_ttm() {
        let ends = quarter_ends(6);
        // Drop the third quarter from the store entirely.
        let slots: Vec<(Date, Option<f64>)> = ends
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .map(|(_, d)| (*d, Some(1.0)))
            .collect();
        let series = AlignedSeries::new(slots);
        let ttm = rolling_ttm(&series, &TtmConfig::default());
        assert!(ttm.iter().all(|(_, v)| v.is_none()));

        let lenient = TtmConfig {
            max_window_span_days: None,
            ..TtmConfig::default()
        };
        assert_eq!(rolling_ttm(&series, &lenient)[3].1, Some(4.0));
    }

    #[test]
    fn test_ttm_yoy_undefined_before_index_seven() {
        let values: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64 * 10.0)).collect();
        let ttm = rolling_ttm(&aligned(&values), &TtmConfig::default());
        let yoy = lagged_growth(&ttm, 4, TtmConfig::default().max_lag_drift_days);
        for (i, (_, v)) in yoy.iter().enumerate() {
            if i < 7 {
                assert!(v.is_none(), "index {i}");
            } else {
                let curr = ttm[i].1.unwrap();
                let prev = ttm[i - 4].1.unwrap();
                assert_relative_eq!(v.unwrap(), curr / prev - 1.0);
            }
        }
    }

    #[test]
    fn test_growth_undefined_on_zero_or_missing_denominator() {
        let slots = aligned(&[Some(0.0), Some(5.0), None, Some(6.0)]);
        let qoq = lagged_growth(slots.slots(), 1, Some(45));
        assert_eq!(qoq[0].1, None);
        assert_eq!(qoq[1].1, None); // previous is zero
        assert_eq!(qoq[2].1, None); // current missing
        assert_eq!(qoq[3].1, None); // previous missing
    }

    #[test]
    fn test_growth_skips_pairs_across_absent_quarter() {
        // 2021-03-31 never reported.
        let ends: Vec<Date> = quarter_ends(9)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != 4)
            .map(|(_, d)| d)
            .collect();
        let rows = ends
            .iter()
            .enumerate()
            .map(|(i, end)| {
                let income = FieldMap::new()
                    .with(fields::REVENUES, 100.0 * (i + 1) as f64)
                    .unwrap();
                (StatementType::Income, *end, income)
            })
            .collect();
        let out = TtmCalculator::default().compute(&inputs(rows));
        let p = &out.points;
        let date = |y, m, d| Date::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(value(p, "Revenue_QoQ", date(2021, 6, 30)), None);
        assert_relative_eq!(value(p, "Revenue_QoQ", date(2021, 9, 30)).unwrap(), 0.2);
        assert_eq!(value(p, "Revenue_YoY_Q", date(2022, 3, 31)), None);
        // Both TTM ends exist, but they are five quarters apart.
        assert_eq!(value(p, "Revenue_TTM", date(2020, 12, 31)), Some(1000.0));
        assert_eq!(value(p, "Revenue_TTM", date(2022, 3, 31)), Some(2600.0));
        assert_eq!(value(p, "Revenue_YoY", date(2022, 3, 31)), None);

        let unchecked = TtmCalculator::new(TtmConfig {
            max_lag_drift_days: None,
            ..TtmConfig::default()
        })
        .compute(&inputs(
            ends.iter()
                .enumerate()
                .map(|(i, end)| {
                    let income = FieldMap::new()
                        .with(fields::REVENUES, 100.0 * (i + 1) as f64)
                        .unwrap();
                    (StatementType::Income, *end, income)
                })
                .collect(),
        ));
        assert_relative_eq!(
            value(&unchecked.points, "Revenue_YoY", date(2022, 3, 31)).unwrap(),
            1.6
        );
    }

    #[test]
    fn test_growth_tolerates_uneven_quarter_lengths() {
        // 52/53-week fiscal calendars end quarters a few days off.
        let slots = vec![
            (Date::from_ymd_opt(2023, 1, 28).unwrap(), Some(10.0)),
            (Date::from_ymd_opt(2023, 4, 29).unwrap(), Some(11.0)),
            (Date::from_ymd_opt(2023, 7, 29).unwrap(), Some(12.0)),
            (Date::from_ymd_opt(2023, 10, 28).unwrap(), Some(13.0)),
            (Date::from_ymd_opt(2024, 2, 3).unwrap(), Some(15.0)),
        ];
        let qoq = lagged_growth(&slots, 1, Some(45));
        assert_relative_eq!(qoq[1].1.unwrap(), 0.1);
        let yoy = lagged_growth(&slots, 4, Some(45));
        assert_relative_eq!(yoy[4].1.unwrap(), 0.5);
    }

    #[test]
    fn test_ebitda_fallback_union() {
        let ends = quarter_ends(3);
        let direct = AlignedSeries::new(vec![(ends[0], Some(100.0))]);
        let op = Series::new(vec![(ends[0], 10.0), (ends[1], 20.0)]);
        let da = Series::new(vec![(ends[1], 2.0), (ends[2], 3.0)]);
        let out = ebitda_quarters(direct, &op, &da, 4);
        assert_eq!(
            out.slots(),
            &[(ends[0], Some(10.0)), (ends[1], Some(22.0)), (ends[2], Some(3.0))]
        );
    }

    #[test]
    fn test_ebitda_direct_kept_with_enough_points() {
        let direct = aligned(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let op = Series::new(vec![(quarter_ends(1)[0], 99.0)]);
        let out = ebitda_quarters(direct.clone(), &op, &Series::default(), 4);
        assert_eq!(out, direct);
    }

    #[test]
    fn test_compute_full_pass() {
        let ends = quarter_ends(8);
        let mut rows = Vec::new();
        for (i, end) in ends.iter().enumerate() {
            let x = (i + 1) as f64;
            let income = FieldMap::new()
                .with(fields::REVENUES, 100.0 * x)
                .unwrap()
                .with(fields::NET_INCOME, 10.0 * x)
                .unwrap()
                .with(fields::GROSS_PROFIT, 40.0 * x)
                .unwrap()
                .with(fields::OPERATING_INCOME, 20.0 * x)
                .unwrap()
                .with(fields::DEPRECIATION_AMORTIZATION, 5.0)
                .unwrap();
            rows.push((StatementType::Income, *end, income));
            let cash = FieldMap::new()
                .with(fields::CFO, 30.0)
                .unwrap()
                .with(fields::CAPEX, 10.0)
                .unwrap();
            rows.push((StatementType::Cashflow, *end, cash));
        }
        let out = TtmCalculator::default().compute(&inputs(rows));
        let p = &out.points;

        // Revenue_TTM at index 3 = 100 + 200 + 300 + 400.
        assert_eq!(value(p, "Revenue_TTM", ends[3]), Some(1000.0));
        assert_eq!(value(p, "Revenue_TTM", ends[2]), None);
        // EBITDA derived from OI + D&A: (20+40+60+80) + 4*5.
        assert_eq!(value(p, "EBITDA_TTM", ends[3]), Some(220.0));
        assert_eq!(value(p, "FCF_TTM", ends[3]), Some(80.0));
        assert_relative_eq!(value(p, "FCF_Margin_TTM", ends[3]).unwrap(), 0.08);
        assert_relative_eq!(value(p, "GrossMargin", ends[0]).unwrap(), 0.4);
        assert_relative_eq!(value(p, "NetMargin_TTM", ends[5]).unwrap(), 0.1);
        assert_relative_eq!(value(p, "Revenue_QoQ", ends[1]).unwrap(), 1.0);
        assert_relative_eq!(value(p, "Revenue_YoY_Q", ends[4]).unwrap(), 4.0);
        // Revenue_YoY (TTM) only from index 7: 2600 / 1000 - 1.
        assert_eq!(value(p, "Revenue_YoY", ends[6]), None);
        assert_relative_eq!(value(p, "Revenue_YoY", ends[7]).unwrap(), 1.6);

        assert_eq!(out.table.at(TtmBase::NetIncome, ends[3]), Some(100.0));
        assert_eq!(out.table.fcf_at(ends[7]), Some(80.0));
        assert!(p.iter().all(|pt| pt.value.is_finite()));
    }

    #[test]
    fn test_da_falls_back_to_cashflow() {
        let ends = quarter_ends(4);
        let rows = ends
            .iter()
            .map(|e| {
                (
                    StatementType::Cashflow,
                    *e,
                    FieldMap::new().with(fields::DA, 2.0).unwrap(),
                )
            })
            .collect();
        let out = TtmCalculator::default().compute(&inputs(rows));
        assert_eq!(out.table.at(TtmBase::Da, ends[3]), Some(8.0));
    }
}
