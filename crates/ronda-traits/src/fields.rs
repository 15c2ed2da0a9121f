//! Validated statement field names and the registry of known line items.
//!
//! Statement payloads are open-ended: adapters may record any line item. Field
//! names are still validated on construction ([`FieldName`]) so a typo such as
//! `"Net Income"` fails loudly instead of silently never resolving, and the
//! constants below are the canonical spellings used by ronda's alias lists.

use crate::{Result, RondaError};
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, collections::BTreeMap, fmt};

/// Maximum accepted length of a field name.
pub const MAX_FIELD_NAME_LEN: usize = 96;

// Income statement (durations)
/// Total revenue.
pub const REVENUE: &str = "Revenue";
/// Total revenue (alternate spelling).
pub const TOTAL_REVENUE: &str = "TotalRevenue";
/// Revenues (XBRL spelling).
pub const REVENUES: &str = "Revenues";
/// Net income.
pub const NET_INCOME: &str = "NetIncome";
/// Net income or loss (XBRL).
pub const NET_INCOME_LOSS: &str = "NetIncomeLoss";
/// Profit or loss including minority interest (XBRL).
pub const PROFIT_LOSS: &str = "ProfitLoss";
/// Reported EBITDA.
pub const EBITDA: &str = "EBITDA";
/// Reported EBITDA (alternate casing).
pub const EBITDA_ALT: &str = "Ebitda";
/// Gross profit.
pub const GROSS_PROFIT: &str = "GrossProfit";
/// Operating income.
pub const OPERATING_INCOME: &str = "OperatingIncome";
/// Operating income or loss (XBRL).
pub const OPERATING_INCOME_LOSS: &str = "OperatingIncomeLoss";
/// Selling, general and administrative expense.
pub const SGA: &str = "SGA";
/// Selling, general and administrative expense (XBRL).
pub const SGA_EXPENSE: &str = "SellingGeneralAndAdministrativeExpense";
/// Research and development expense.
pub const RND: &str = "RnD";
/// Research and development expense (XBRL).
pub const RND_EXPENSE: &str = "ResearchAndDevelopmentExpense";
/// Depreciation and amortization.
pub const DEPRECIATION_AMORTIZATION: &str = "DepreciationAndAmortization";
/// Depreciation, depletion and amortization (XBRL).
pub const DEPRECIATION_DEPLETION_AMORTIZATION: &str = "DepreciationDepletionAndAmortization";
/// Depreciation, amortization and accretion (XBRL).
pub const DEPRECIATION_AMORTIZATION_ACCRETION: &str = "DepreciationAmortizationAndAccretionNet";
/// Depreciation and amortization (short form).
pub const DA: &str = "DA";
/// Diluted weighted average shares outstanding.
pub const WEIGHTED_AVERAGE_SHS_OUT_DIL: &str = "WeightedAverageShsOutDil";
/// Diluted weighted average shares outstanding (XBRL).
pub const WEIGHTED_AVERAGE_DILUTED_SHARES: &str = "WeightedAverageNumberOfDilutedSharesOutstanding";
/// Diluted weighted average shares outstanding (alternate XBRL).
pub const WEIGHTED_AVERAGE_SHARES_DILUTED: &str = "WeightedAverageNumberOfSharesOutstandingDiluted";
/// Diluted shares (short form).
pub const DILUTED_SHARES: &str = "DilutedShares";
/// Earnings per share.
pub const EPS: &str = "EPS";
/// Diluted earnings per share.
pub const DILUTED_EPS: &str = "DilutedEPS";

// Balance sheet (instants)
/// Cash and cash equivalents.
pub const CASH_AND_EQUIVALENTS: &str = "CashAndCashEquivalents";
/// Cash and short-term investments.
pub const CASH_AND_SHORT_TERM_INVESTMENTS: &str = "CashAndShortTermInvestments";
/// Cash including restricted cash (XBRL).
pub const CASH_INCLUDING_RESTRICTED: &str =
    "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents";
/// Cash (short form).
pub const CASH: &str = "Cash";
/// Short-term debt.
pub const SHORT_TERM_DEBT: &str = "ShortTermDebt";
/// Current portion of debt (XBRL).
pub const DEBT_CURRENT: &str = "DebtCurrent";
/// Short-term borrowings (XBRL).
pub const SHORT_TERM_BORROWINGS: &str = "ShortTermBorrowings";
/// Current debt.
pub const CURRENT_DEBT: &str = "CurrentDebt";
/// Short debt (short form).
pub const SHORT_DEBT: &str = "ShortDebt";
/// Long-term debt.
pub const LONG_TERM_DEBT: &str = "LongTermDebt";
/// Non-current long-term debt (XBRL).
pub const LONG_TERM_DEBT_NONCURRENT: &str = "LongTermDebtNoncurrent";
/// Long-term borrowings (XBRL).
pub const LONG_TERM_BORROWINGS: &str = "LongTermBorrowings";
/// Long debt (short form).
pub const LONG_DEBT: &str = "LongDebt";
/// Common shares outstanding at the balance sheet date.
pub const COMMON_SHARES_OUTSTANDING: &str = "CommonStockSharesOutstanding";
/// Common shares (short form).
pub const COMMON_SHARES: &str = "CommonShares";
/// Total assets.
pub const TOTAL_ASSETS: &str = "TotalAssets";
/// Total current assets.
pub const CURRENT_ASSETS: &str = "CurrentAssets";
/// Total current liabilities.
pub const CURRENT_LIABILITIES: &str = "CurrentLiabilities";

// Cash flow statement (durations)
/// Cash flow from operations.
pub const CFO: &str = "CFO";
/// Cash flow from operations (XBRL).
pub const NET_CASH_FROM_OPERATIONS: &str = "NetCashProvidedByUsedInOperatingActivities";
/// Operating cash flow.
pub const OPERATING_CASH_FLOW: &str = "OperatingCashFlow";
/// Capital expenditure, positive magnitude.
pub const CAPEX: &str = "CapEx";
/// Capital expenditure (long form).
pub const CAPITAL_EXPENDITURE: &str = "CapitalExpenditure";
/// Purchases of property, plant and equipment (XBRL).
pub const PAYMENTS_FOR_PPE: &str = "PaymentsToAcquirePropertyPlantAndEquipment";

/// Every field name ronda's alias lists refer to.
pub const KNOWN_FIELDS: &[&str] = &[
    REVENUE,
    TOTAL_REVENUE,
    REVENUES,
    NET_INCOME,
    NET_INCOME_LOSS,
    PROFIT_LOSS,
    EBITDA,
    EBITDA_ALT,
    GROSS_PROFIT,
    OPERATING_INCOME,
    OPERATING_INCOME_LOSS,
    SGA,
    SGA_EXPENSE,
    RND,
    RND_EXPENSE,
    DEPRECIATION_AMORTIZATION,
    DEPRECIATION_DEPLETION_AMORTIZATION,
    DEPRECIATION_AMORTIZATION_ACCRETION,
    DA,
    WEIGHTED_AVERAGE_SHS_OUT_DIL,
    WEIGHTED_AVERAGE_DILUTED_SHARES,
    WEIGHTED_AVERAGE_SHARES_DILUTED,
    DILUTED_SHARES,
    EPS,
    DILUTED_EPS,
    CASH_AND_EQUIVALENTS,
    CASH_AND_SHORT_TERM_INVESTMENTS,
    CASH_INCLUDING_RESTRICTED,
    CASH,
    SHORT_TERM_DEBT,
    DEBT_CURRENT,
    SHORT_TERM_BORROWINGS,
    CURRENT_DEBT,
    SHORT_DEBT,
    LONG_TERM_DEBT,
    LONG_TERM_DEBT_NONCURRENT,
    LONG_TERM_BORROWINGS,
    LONG_DEBT,
    COMMON_SHARES_OUTSTANDING,
    COMMON_SHARES,
    TOTAL_ASSETS,
    CURRENT_ASSETS,
    CURRENT_LIABILITIES,
    CFO,
    NET_CASH_FROM_OPERATIONS,
    OPERATING_CASH_FLOW,
    CAPEX,
    CAPITAL_EXPENDITURE,
    PAYMENTS_FOR_PPE,
];

/// Whether `name` is one of the registered field names.
#[must_use]
pub fn is_known(name: &str) -> bool {
    KNOWN_FIELDS.contains(&name)
}

/// A validated statement line-item name.
///
/// Names are non-empty, at most [`MAX_FIELD_NAME_LEN`] bytes, and consist of
/// ASCII letters, digits and underscores. Unknown but well-formed names are
/// accepted; the vocabulary stays open.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Validate and wrap a field name.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidField`] if the name is empty, too long, or
    /// contains characters other than ASCII alphanumerics and `_`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_FIELD_NAME_LEN {
            return Err(RondaError::InvalidField(name));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RondaError::InvalidField(name));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name is part of the registry.
    #[must_use]
    pub fn is_known(&self) -> bool {
        is_known(&self.0)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldName {
    type Error = RondaError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FieldName {
    type Error = RondaError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> Self {
        name.0
    }
}

/// A raw observed value, as delivered by an ingestion adapter.
///
/// Values are kept as observed; coercion to a finite float happens when a
/// series is resolved, so a malformed value never reaches a calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A numeric value.
    Number(f64),
    /// A textual value, possibly numeric ("1234.5").
    Text(String),
}

impl RawValue {
    /// Coerce to a finite float, rejecting NaN, infinities and non-numeric text.
    #[must_use]
    pub fn to_finite(&self) -> Option<f64> {
        let v = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// The field payload of one statement row: validated names to optional values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<FieldName, Option<RawValue>>);

impl FieldMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a field, validating its name.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidField`] if `name` is not a valid field name.
    pub fn set(&mut self, name: &str, value: impl Into<RawValue>) -> Result<()> {
        self.0.insert(FieldName::new(name)?, Some(value.into()));
        Ok(())
    }

    /// Set a field to an explicit null.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidField`] if `name` is not a valid field name.
    pub fn set_null(&mut self, name: &str) -> Result<()> {
        self.0.insert(FieldName::new(name)?, None);
        Ok(())
    }

    /// Builder form of [`FieldMap::set`] for numeric values.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidField`] if `name` is not a valid field name.
    pub fn with(mut self, name: &str, value: f64) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Get a non-null raw value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.0.get(name).and_then(Option::as_ref)
    }

    /// Merge a newer observation of the same row into this one.
    ///
    /// Non-null values in `newer` overwrite; nulls in `newer` never erase a
    /// stored value. Fields absent from `newer` are kept.
    pub fn merge(&mut self, newer: &Self) {
        for (name, value) in &newer.0 {
            match value {
                Some(v) => {
                    self.0.insert(name.clone(), Some(v.clone()));
                }
                None => {
                    self.0.entry(name.clone()).or_insert(None);
                }
            }
        }
    }

    /// Number of fields, nulls included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, Option<&RawValue>)> {
        self.0.iter().map(|(k, v)| (k, v.as_ref()))
    }
}
