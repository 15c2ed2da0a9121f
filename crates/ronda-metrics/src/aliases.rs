//! Ordered alias lists for every raw line item the calculators read.
//!
//! The first alias with a usable value wins, so the canonical name comes
//! first and vendor spellings follow.

use ronda_traits::fields::*;

/// Revenue (income statement).
pub const REVENUE_ALIASES: &[&str] = &[REVENUE, TOTAL_REVENUE, REVENUES];

/// Net income (income statement).
pub const NET_INCOME_ALIASES: &[&str] = &[NET_INCOME, NET_INCOME_LOSS, PROFIT_LOSS];

/// Directly reported EBITDA (income statement).
pub const EBITDA_ALIASES: &[&str] = &[EBITDA, EBITDA_ALT];

/// Gross profit (income statement).
pub const GROSS_PROFIT_ALIASES: &[&str] = &[GROSS_PROFIT];

/// Operating income (income statement).
pub const OPERATING_INCOME_ALIASES: &[&str] = &[OPERATING_INCOME, OPERATING_INCOME_LOSS];

/// Selling, general and administrative expense (income statement).
pub const SGA_ALIASES: &[&str] = &[SGA, SGA_EXPENSE];

/// Research and development expense (income statement).
pub const RND_ALIASES: &[&str] = &[RND, RND_EXPENSE];

/// Depreciation and amortization (income or cash-flow statement).
pub const DA_ALIASES: &[&str] = &[
    DEPRECIATION_AMORTIZATION,
    DEPRECIATION_DEPLETION_AMORTIZATION,
    DEPRECIATION_AMORTIZATION_ACCRETION,
    DA,
];

/// Diluted weighted-average shares (income statement duration).
pub const DILUTED_SHARES_ALIASES: &[&str] = &[
    WEIGHTED_AVERAGE_SHS_OUT_DIL,
    WEIGHTED_AVERAGE_DILUTED_SHARES,
    WEIGHTED_AVERAGE_SHARES_DILUTED,
    DILUTED_SHARES,
];

/// Common shares outstanding (balance sheet instant).
pub const COMMON_SHARES_ALIASES: &[&str] = &[COMMON_SHARES_OUTSTANDING, COMMON_SHARES];

/// Cash and equivalents (balance sheet).
pub const CASH_ALIASES: &[&str] = &[
    CASH_AND_EQUIVALENTS,
    CASH_AND_SHORT_TERM_INVESTMENTS,
    CASH_INCLUDING_RESTRICTED,
    CASH,
];

/// Short-term debt (balance sheet).
pub const SHORT_DEBT_ALIASES: &[&str] = &[
    SHORT_TERM_DEBT,
    DEBT_CURRENT,
    SHORT_TERM_BORROWINGS,
    CURRENT_DEBT,
    SHORT_DEBT,
];

/// Long-term debt (balance sheet).
pub const LONG_DEBT_ALIASES: &[&str] = &[
    LONG_TERM_DEBT,
    LONG_TERM_DEBT_NONCURRENT,
    LONG_TERM_BORROWINGS,
    LONG_DEBT,
];

/// Total assets (balance sheet).
pub const TOTAL_ASSETS_ALIASES: &[&str] = &[TOTAL_ASSETS];

/// Current assets (balance sheet).
pub const CURRENT_ASSETS_ALIASES: &[&str] = &[CURRENT_ASSETS];

/// Current liabilities (balance sheet).
pub const CURRENT_LIABILITIES_ALIASES: &[&str] = &[CURRENT_LIABILITIES];

/// Cash from operations (cash-flow statement).
pub const CFO_ALIASES: &[&str] = &[CFO, NET_CASH_FROM_OPERATIONS, OPERATING_CASH_FLOW];

/// Capital expenditure as a positive magnitude (cash-flow statement).
pub const CAPEX_ALIASES: &[&str] = &[CAPEX, CAPITAL_EXPENDITURE, PAYMENTS_FOR_PPE];

/// Every alias list, for registry checks.
pub const ALL_ALIAS_LISTS: &[&[&str]] = &[
    REVENUE_ALIASES,
    NET_INCOME_ALIASES,
    EBITDA_ALIASES,
    GROSS_PROFIT_ALIASES,
    OPERATING_INCOME_ALIASES,
    SGA_ALIASES,
    RND_ALIASES,
    DA_ALIASES,
    DILUTED_SHARES_ALIASES,
    COMMON_SHARES_ALIASES,
    CASH_ALIASES,
    SHORT_DEBT_ALIASES,
    LONG_DEBT_ALIASES,
    TOTAL_ASSETS_ALIASES,
    CURRENT_ASSETS_ALIASES,
    CURRENT_LIABILITIES_ALIASES,
    CFO_ALIASES,
    CAPEX_ALIASES,
];
