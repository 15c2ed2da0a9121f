//! Point-in-time valuation.
//!
//! Every quarterly revenue period end is an anchor. Shares, cash, debt and
//! price are joined to it with the as-of rule (latest point on or before the
//! anchor), then combined with the TTM table into market cap, enterprise
//! value and the valuation ratios.

use crate::{
    aliases::*,
    resolver::{CompanyInputs, Series},
    ttm::{TtmBase, TtmTable},
};
use ronda_traits::{Date, MetricPeriod, MetricPoint, StatementType, stats::safe_div};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the valuation calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Write NetDebt, DebtToAssets and CurrentRatio at each anchor (default: true)
    pub balance_ratios: bool,

    /// Write the latest daily Price / MarketCap snapshot (default: true)
    pub daily_snapshot: bool,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            balance_ratios: true,
            daily_snapshot: true,
        }
    }
}

/// Everything resolved as of one anchor date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnchorInputs {
    /// Positive share count.
    pub shares: Option<f64>,
    /// Close on or before the anchor.
    pub price: Option<f64>,
    /// Cash; `None` means unresolved (treated as zero in EV).
    pub cash: Option<f64>,
    /// Short + long debt; `None` when neither component resolves.
    pub debt: Option<f64>,
}

impl AnchorInputs {
    /// `price * shares`.
    #[must_use]
    pub fn market_cap(&self) -> Option<f64> {
        Some(self.price? * self.shares?)
    }

    /// `market cap + debt - cash`; needs both market cap and debt.
    #[must_use]
    pub fn enterprise_value(&self) -> Option<f64> {
        Some(self.market_cap()? + self.debt? - self.cash.unwrap_or(0.0))
    }

    /// `debt - cash`.
    #[must_use]
    pub fn net_debt(&self) -> Option<f64> {
        Some(self.debt? - self.cash.unwrap_or(0.0))
    }
}

/// Sum of debt components, counting a missing one as zero once the other
/// resolves.
#[must_use]
pub fn total_debt(short: Option<f64>, long: Option<f64>) -> Option<f64> {
    match (short, long) {
        (None, None) => None,
        (s, l) => Some(s.unwrap_or(0.0) + l.unwrap_or(0.0)),
    }
}

/// `price / eps`, only for strictly positive EPS.
#[must_use]
pub fn price_to_earnings(price: f64, eps: f64) -> Option<f64> {
    if eps > 0.0 { safe_div(price, eps) } else { None }
}

/// `ev / ebitda`, only for strictly positive EBITDA.
#[must_use]
pub fn ev_to_ebitda(ev: f64, ebitda: f64) -> Option<f64> {
    if ebitda > 0.0 { safe_div(ev, ebitda) } else { None }
}

fn positive(point: Option<(Date, f64)>) -> Option<f64> {
    point.map(|(_, v)| v).filter(|v| *v > 0.0)
}

/// The as-of series one company's valuation needs.
#[derive(Debug, Clone, Default)]
pub struct BalanceInputs {
    diluted_shares: Series,
    common_shares: Series,
    cash: Series,
    short_debt: Series,
    long_debt: Series,
    total_assets: Series,
    current_assets: Series,
    current_liabilities: Series,
    closes: Series,
}

impl BalanceInputs {
    /// Resolve every series from a company's rows.
    #[must_use]
    pub fn resolve(inputs: &CompanyInputs) -> Self {
        let bs = |aliases: &[&str]| inputs.series(StatementType::Balance, aliases);
        Self {
            diluted_shares: inputs.series(StatementType::Income, DILUTED_SHARES_ALIASES),
            common_shares: bs(COMMON_SHARES_ALIASES),
            cash: bs(CASH_ALIASES),
            short_debt: bs(SHORT_DEBT_ALIASES),
            long_debt: bs(LONG_DEBT_ALIASES),
            total_assets: bs(TOTAL_ASSETS_ALIASES),
            current_assets: bs(CURRENT_ASSETS_ALIASES),
            current_liabilities: bs(CURRENT_LIABILITIES_ALIASES),
            closes: inputs.closes(),
        }
    }

    /// Diluted shares as of `date`, else common shares; non-positive counts
    /// are unresolved.
    #[must_use]
    pub fn shares_as_of(&self, date: Date) -> Option<f64> {
        positive(self.diluted_shares.as_of(date)).or_else(|| positive(self.common_shares.as_of(date)))
    }

    /// Most recent share count regardless of date.
    #[must_use]
    pub fn latest_shares(&self) -> Option<f64> {
        positive(self.diluted_shares.last()).or_else(|| positive(self.common_shares.last()))
    }

    /// All anchor joins for `date`.
    #[must_use]
    pub fn anchor(&self, date: Date) -> AnchorInputs {
        AnchorInputs {
            shares: self.shares_as_of(date),
            price: self.closes.as_of(date).map(|(_, p)| p),
            cash: self.cash.as_of(date).map(|(_, c)| c),
            debt: total_debt(
                self.short_debt.as_of(date).map(|(_, v)| v),
                self.long_debt.as_of(date).map(|(_, v)| v),
            ),
        }
    }
}

/// Computes market cap, EV and valuation ratios for one company.
#[derive(Debug, Clone, Default)]
pub struct ValuationCalculator {
    config: ValuationConfig,
}

impl ValuationCalculator {
    /// Create a new calculator with the given configuration.
    #[must_use]
    pub const fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// Anchor points plus the daily snapshot.
    #[must_use]
    pub fn compute(&self, inputs: &CompanyInputs, ttm: &TtmTable) -> Vec<MetricPoint> {
        let balance = BalanceInputs::resolve(inputs);
        let anchors = inputs.series(StatementType::Income, REVENUE_ALIASES);
        let mut points = Vec::new();

        if anchors.is_empty() {
            debug!(ticker = %inputs.ticker, "no revenue series, skipping valuation anchors");
        }

        for date in anchors.dates() {
            let at = balance.anchor(date);
            let mut put = |key: &str, period: MetricPeriod, value: Option<f64>| {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    points.push(MetricPoint::new(key, date, period, v));
                }
            };

            let market_cap = at.market_cap();
            let ev = at.enterprise_value();
            let eps = ttm
                .at(TtmBase::NetIncome, date)
                .zip(at.shares)
                .and_then(|(ni, shares)| safe_div(ni, shares));

            put("Shares", MetricPeriod::Quarter, at.shares);
            put("MarketCap", MetricPeriod::Quarter, market_cap);
            put("EnterpriseValue", MetricPeriod::Quarter, ev);
            put("EPS_TTM", MetricPeriod::Ttm, eps);
            put(
                "PE_TTM",
                MetricPeriod::Ttm,
                at.price.zip(eps).and_then(|(p, e)| price_to_earnings(p, e)),
            );
            put(
                "EV_Sales",
                MetricPeriod::Ttm,
                ev.zip(ttm.at(TtmBase::Revenue, date))
                    .and_then(|(ev, rev)| safe_div(ev, rev)),
            );
            put(
                "EV_EBITDA",
                MetricPeriod::Ttm,
                ev.zip(ttm.at(TtmBase::Ebitda, date))
                    .and_then(|(ev, ebitda)| ev_to_ebitda(ev, ebitda)),
            );
            put(
                "FCF_Yield",
                MetricPeriod::Ttm,
                ttm.fcf_at(date)
                    .zip(market_cap.filter(|m| *m > 0.0))
                    .and_then(|(fcf, mcap)| safe_div(fcf, mcap)),
            );

            if self.config.balance_ratios {
                let assets = balance.total_assets.as_of(date).map(|(_, v)| v);
                let current_assets = balance.current_assets.as_of(date).map(|(_, v)| v);
                let current_liabilities = balance.current_liabilities.as_of(date).map(|(_, v)| v);
                put("NetDebt", MetricPeriod::Quarter, at.net_debt());
                put(
                    "DebtToAssets",
                    MetricPeriod::Quarter,
                    at.debt.zip(assets).and_then(|(d, a)| safe_div(d, a)),
                );
                put(
                    "CurrentRatio",
                    MetricPeriod::Quarter,
                    current_assets
                        .zip(current_liabilities)
                        .and_then(|(a, l)| safe_div(a, l)),
                );
            }
        }

        if self.config.daily_snapshot {
            points.extend(self.snapshot(&balance));
        }

        debug!(ticker = %inputs.ticker, points = points.len(), "computed valuation metrics");
        points
    }

    /// Price and MarketCap at the most recent bar, using the most recent
    /// known share count.
    fn snapshot(&self, balance: &BalanceInputs) -> Vec<MetricPoint> {
        let Some((date, price)) = balance.closes.last() else {
            return Vec::new();
        };
        let mut out = vec![MetricPoint::new("Price", date, MetricPeriod::Daily, price)];
        if let Some(mcap) = balance.latest_shares().map(|s| s * price).filter(|m| m.is_finite()) {
            out.push(MetricPoint::new("MarketCap", date, MetricPeriod::Daily, mcap));
        }
        out
    }
}
