//! Metric registry for discovering and categorizing derived metrics.
//!
//! Every key the calculators write is listed here with the period types it is
//! written under.

use ronda_traits::MetricPeriod;
use serde::{Deserialize, Serialize};

/// Metric category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricCategory {
    /// Trailing sums and balance sheet aggregates
    Fundamental,
    /// Period-over-period growth rates
    Growth,
    /// Profitability margins
    Margin,
    /// Price-based valuation multiples
    Valuation,
    /// Indicators computed from daily prices
    Technical,
}

impl MetricCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Fundamental => "Trailing-twelve-month sums and balance sheet aggregates",
            Self::Growth => "Quarter-over-quarter and year-over-year growth",
            Self::Margin => "Quarterly and trailing profitability margins",
            Self::Valuation => "Market cap, enterprise value and valuation multiples",
            Self::Technical => "Moving averages, RSI, range distance and volatility",
        }
    }

    /// Parse a category name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        available_categories()
            .into_iter()
            .find(|c| format!("{c:?}").eq_ignore_ascii_case(name.trim()))
    }
}

/// Metadata about a derived metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    /// Metric key as stored
    pub key: &'static str,

    /// Category classification
    pub category: MetricCategory,

    /// Period types the key is written under
    pub periods: &'static [MetricPeriod],

    /// Human-readable description
    pub description: &'static str,
}

const Q: &[MetricPeriod] = &[MetricPeriod::Quarter];
const TTM: &[MetricPeriod] = &[MetricPeriod::Ttm];
const DAILY: &[MetricPeriod] = &[MetricPeriod::Daily];
const Q_DAILY: &[MetricPeriod] = &[MetricPeriod::Quarter, MetricPeriod::Daily];

const fn info(
    key: &'static str,
    category: MetricCategory,
    periods: &'static [MetricPeriod],
    description: &'static str,
) -> MetricInfo {
    MetricInfo {
        key,
        category,
        periods,
        description,
    }
}

/// Get information about all derived metrics.
#[must_use]
pub fn available_metrics() -> Vec<MetricInfo> {
    use MetricCategory::*;
    vec![
        // Trailing sums
        info("Revenue_TTM", Fundamental, TTM, "Revenue over the last four quarters"),
        info("NetIncome_TTM", Fundamental, TTM, "Net income over the last four quarters"),
        info("GrossProfit_TTM", Fundamental, TTM, "Gross profit over the last four quarters"),
        info(
            "OperatingIncome_TTM",
            Fundamental,
            TTM,
            "Operating income over the last four quarters",
        ),
        info("SGA_TTM", Fundamental, TTM, "SG&A expense over the last four quarters"),
        info("RnD_TTM", Fundamental, TTM, "R&D expense over the last four quarters"),
        info("DA_TTM", Fundamental, TTM, "Depreciation and amortization, trailing"),
        info(
            "EBITDA_TTM",
            Fundamental,
            TTM,
            "Reported EBITDA, or operating income plus D&A, trailing",
        ),
        info("CFO_TTM", Fundamental, TTM, "Cash from operations, trailing"),
        info("CapEx_TTM", Fundamental, TTM, "Capital expenditure magnitude, trailing"),
        info("FCF_TTM", Fundamental, TTM, "CFO_TTM minus CapEx_TTM"),
        info("EPS_TTM", Fundamental, TTM, "NetIncome_TTM per share"),
        info("NetDebt", Fundamental, Q, "Total debt minus cash"),
        // Growth
        info("Revenue_QoQ", Growth, Q, "Quarterly revenue vs previous quarter"),
        info("Revenue_YoY_Q", Growth, Q, "Quarterly revenue vs four quarters earlier"),
        info("Revenue_YoY", Growth, TTM, "Revenue_TTM vs four quarters earlier"),
        info("NetIncome_QoQ", Growth, Q, "Quarterly net income vs previous quarter"),
        info(
            "NetIncome_YoY_Q",
            Growth,
            Q,
            "Quarterly net income vs four quarters earlier",
        ),
        info("NetIncome_YoY", Growth, TTM, "NetIncome_TTM vs four quarters earlier"),
        // Margins
        info("GrossMargin", Margin, Q, "Gross profit / revenue"),
        info("OpMargin", Margin, Q, "Operating income / revenue"),
        info("NetMargin", Margin, Q, "Net income / revenue"),
        info("GrossMargin_TTM", Margin, TTM, "GrossProfit_TTM / Revenue_TTM"),
        info("OpMargin_TTM", Margin, TTM, "OperatingIncome_TTM / Revenue_TTM"),
        info("NetMargin_TTM", Margin, TTM, "NetIncome_TTM / Revenue_TTM"),
        info("EBITDAMargin_TTM", Margin, TTM, "EBITDA_TTM / Revenue_TTM"),
        info("FCF_Margin_TTM", Margin, TTM, "FCF_TTM / Revenue_TTM"),
        // Valuation
        info("Shares", Valuation, Q, "Diluted shares, else common shares outstanding"),
        info("MarketCap", Valuation, Q_DAILY, "Price times shares"),
        info("EnterpriseValue", Valuation, Q, "Market cap plus debt minus cash"),
        info("PE_TTM", Valuation, TTM, "Price / EPS_TTM, positive earnings only"),
        info("EV_Sales", Valuation, TTM, "Enterprise value / Revenue_TTM"),
        info(
            "EV_EBITDA",
            Valuation,
            TTM,
            "Enterprise value / EBITDA_TTM, positive EBITDA only",
        ),
        info("FCF_Yield", Valuation, TTM, "FCF_TTM / market cap"),
        info("DebtToAssets", Valuation, Q, "Total debt / total assets"),
        info("CurrentRatio", Valuation, Q, "Current assets / current liabilities"),
        // Technicals
        info("Price", Technical, DAILY, "Latest close"),
        info("SMA_50", Technical, DAILY, "50-day simple moving average"),
        info("SMA_200", Technical, DAILY, "200-day simple moving average"),
        info("RSI_14", Technical, DAILY, "14-day Wilder RSI"),
        info("DistTo52wHigh", Technical, DAILY, "Close relative to the 252-day high"),
        info("DistTo52wLow", Technical, DAILY, "Close relative to the 252-day low"),
        info("Vol_30d", Technical, DAILY, "Annualized 30-day realized volatility"),
    ]
}

/// Get all metrics in a specific category.
#[must_use]
pub fn metrics_by_category(category: &MetricCategory) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific metric by key.
#[must_use]
pub fn get_metric_info(key: &str) -> Option<MetricInfo> {
    available_metrics().into_iter().find(|info| info.key == key)
}

/// Get all metric categories with metrics.
#[must_use]
pub fn available_categories() -> Vec<MetricCategory> {
    let mut categories: Vec<_> = available_metrics()
        .into_iter()
        .map(|info| info.category)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}
