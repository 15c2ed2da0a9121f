//! Data types for FMP API responses and their normalization into ronda
//! observations.

use chrono::NaiveDate;
use ronda_traits::{
    FieldMap, PeriodType, PriceBar, Result, StatementObservation, StatementType, Ticker, fields,
};
use serde::{Deserialize, Serialize};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    Annual,
    /// Quarterly reports (10-Q filings).
    #[default]
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }

    /// Matching statement period type.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        match self {
            Self::Annual => PeriodType::Year,
            Self::Quarter => PeriodType::Quarter,
        }
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    date.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Set every finite value; absent and non-finite values are left out so a
/// merge never erases stored data.
fn field_map(values: &[(&str, Option<f64>)]) -> Result<FieldMap> {
    let mut map = FieldMap::new();
    for (name, value) in values {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            map.set(name, v)?;
        }
    }
    Ok(map)
}

/// A statement payload that normalizes to registry field names.
pub trait FmpStatement {
    /// Statement kind.
    const STATEMENT: StatementType;

    /// Period end as reported.
    fn date(&self) -> &str;

    /// Normalized line items.
    ///
    /// # Errors
    ///
    /// Returns an error if a field name is invalid.
    fn to_fields(&self) -> Result<FieldMap>;

    /// Parsed period end.
    fn period_end(&self) -> Option<NaiveDate> {
        parse_date(self.date())
    }

    /// Observation row for `ticker`, or `None` when the date is unusable.
    ///
    /// # Errors
    ///
    /// Returns an error if a field name is invalid.
    fn to_observation(
        &self,
        ticker: &Ticker,
        period_type: PeriodType,
    ) -> Result<Option<StatementObservation>> {
        let Some(end) = self.period_end() else {
            return Ok(None);
        };
        Ok(Some(StatementObservation::new(
            ticker.clone(),
            Self::STATEMENT,
            period_type,
            end,
            self.to_fields()?,
        )))
    }
}

/// Income statement data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeStatement {
    /// Period end date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period (FY, Q1..Q4).
    pub period: String,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Gross profit.
    pub gross_profit: Option<f64>,
    /// Selling, general and administrative expenses.
    pub selling_general_and_administrative_expenses: Option<f64>,
    /// Research and development expenses.
    pub research_and_development_expenses: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Depreciation and amortization.
    pub depreciation_and_amortization: Option<f64>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Earnings per share (basic).
    pub eps: Option<f64>,
    /// Earnings per share (diluted).
    pub eps_diluted: Option<f64>,
    /// Diluted weighted average shares outstanding.
    pub weighted_average_shs_out_dil: Option<f64>,
}

impl FmpStatement for IncomeStatement {
    const STATEMENT: StatementType = StatementType::Income;

    fn date(&self) -> &str {
        &self.date
    }

    fn to_fields(&self) -> Result<FieldMap> {
        field_map(&[
            (fields::REVENUE, self.revenue),
            (fields::GROSS_PROFIT, self.gross_profit),
            (fields::SGA, self.selling_general_and_administrative_expenses),
            (fields::RND, self.research_and_development_expenses),
            (fields::OPERATING_INCOME, self.operating_income),
            (
                fields::DEPRECIATION_AMORTIZATION,
                self.depreciation_and_amortization,
            ),
            (fields::EBITDA, self.ebitda),
            (fields::NET_INCOME, self.net_income),
            (fields::EPS, self.eps),
            (fields::DILUTED_EPS, self.eps_diluted),
            (
                fields::WEIGHTED_AVERAGE_SHS_OUT_DIL,
                self.weighted_average_shs_out_dil,
            ),
        ])
    }
}

/// Balance sheet data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceSheet {
    /// Period end date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period.
    pub period: String,
    /// Cash and cash equivalents.
    pub cash_and_cash_equivalents: Option<f64>,
    /// Cash plus short-term investments.
    pub cash_and_short_term_investments: Option<f64>,
    /// Total current assets.
    pub total_current_assets: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total current liabilities.
    pub total_current_liabilities: Option<f64>,
    /// Short-term debt.
    pub short_term_debt: Option<f64>,
    /// Long-term debt.
    pub long_term_debt: Option<f64>,
    /// Common shares outstanding, when reported.
    pub common_stock_shares_outstanding: Option<f64>,
}

impl FmpStatement for BalanceSheet {
    const STATEMENT: StatementType = StatementType::Balance;

    fn date(&self) -> &str {
        &self.date
    }

    fn to_fields(&self) -> Result<FieldMap> {
        field_map(&[
            (fields::CASH_AND_EQUIVALENTS, self.cash_and_cash_equivalents),
            (
                fields::CASH_AND_SHORT_TERM_INVESTMENTS,
                self.cash_and_short_term_investments,
            ),
            (fields::CURRENT_ASSETS, self.total_current_assets),
            (fields::TOTAL_ASSETS, self.total_assets),
            (fields::CURRENT_LIABILITIES, self.total_current_liabilities),
            (fields::SHORT_TERM_DEBT, self.short_term_debt),
            (fields::LONG_TERM_DEBT, self.long_term_debt),
            (
                fields::COMMON_SHARES_OUTSTANDING,
                self.common_stock_shares_outstanding,
            ),
        ])
    }
}

/// Cash flow statement data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashFlowStatement {
    /// Period end date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period.
    pub period: String,
    /// Cash from operations.
    pub operating_cash_flow: Option<f64>,
    /// Capital expenditure, reported as a negative outflow.
    pub capital_expenditure: Option<f64>,
    /// Depreciation and amortization.
    pub depreciation_and_amortization: Option<f64>,
}

impl FmpStatement for CashFlowStatement {
    const STATEMENT: StatementType = StatementType::Cashflow;

    fn date(&self) -> &str {
        &self.date
    }

    fn to_fields(&self) -> Result<FieldMap> {
        field_map(&[
            (fields::CFO, self.operating_cash_flow),
            (fields::CAPEX, self.capital_expenditure.map(f64::abs)),
            (
                fields::DEPRECIATION_AMORTIZATION,
                self.depreciation_and_amortization,
            ),
        ])
    }
}

/// One daily bar from the end-of-day endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalPrice {
    /// Trading date.
    pub date: String,
    /// Open.
    pub open: Option<f64>,
    /// High.
    pub high: Option<f64>,
    /// Low.
    pub low: Option<f64>,
    /// Close.
    pub close: Option<f64>,
    /// Volume.
    pub volume: Option<f64>,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Price bar, or `None` without a date or a finite close.
    #[must_use]
    pub fn to_bar(&self) -> Option<PriceBar> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let close = finite(self.close)?;
        Some(PriceBar {
            date: self.parsed_date()?,
            open: finite(self.open),
            high: finite(self.high),
            low: finite(self.low),
            close: Some(close),
            volume: finite(self.volume).map(|v| v.round() as i64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_statement_normalization() {
        let json = r#"{
            "date": "2024-03-30",
            "symbol": "AAPL",
            "period": "Q2",
            "revenue": 90753000000,
            "netIncome": 23636000000,
            "ebitda": null,
            "weightedAverageShsOutDil": 15464709000
        }"#;
        let is: IncomeStatement = serde_json::from_str(json).unwrap();
        let map = is.to_fields().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.get(fields::REVENUE).and_then(|v| v.to_finite()),
            Some(90_753_000_000.0)
        );
        assert!(map.get(fields::EBITDA).is_none());

        let obs = is
            .to_observation(&Ticker::new("aapl"), PeriodType::Quarter)
            .unwrap()
            .unwrap();
        assert_eq!(obs.statement_type, StatementType::Income);
        assert_eq!(obs.period_end, NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        assert_eq!(obs.ticker.as_str(), "AAPL");
    }

    #[test]
    fn test_capex_is_stored_as_magnitude() {
        let cf = CashFlowStatement {
            date: "2024-03-30".into(),
            operating_cash_flow: Some(100.0),
            capital_expenditure: Some(-25.0),
            ..Default::default()
        };
        let map = cf.to_fields().unwrap();
        assert_eq!(map.get(fields::CAPEX).and_then(|v| v.to_finite()), Some(25.0));
    }

    #[test]
    fn test_bad_date_is_skipped() {
        let bs = BalanceSheet {
            date: "n/a".into(),
            total_assets: Some(1.0),
            ..Default::default()
        };
        assert!(bs.to_observation(&Ticker::new("X"), PeriodType::Year).unwrap().is_none());
    }

    #[test]
    fn test_price_bar_requires_close() {
        let json = r#"[
            {"date": "2024-01-02", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 1000.4},
            {"date": "2024-01-03", "open": 1.0}
        ]"#;
        let prices: Vec<HistoricalPrice> = serde_json::from_str(json).unwrap();
        let bars: Vec<PriceBar> = prices.iter().filter_map(HistoricalPrice::to_bar).collect();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, Some(1000));
        assert_eq!(bars[0].close, Some(1.5));
    }
}
