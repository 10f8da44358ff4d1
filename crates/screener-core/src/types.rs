use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Raw provider output: provider key → value, `None` when the source reported
/// the field but had no number for it.
pub type RawMetrics = HashMap<String, Option<f64>>;

/// Trim and uppercase a user-entered ticker symbol.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Named financial metrics a profile can test.
///
/// The serde name of each variant is its provider key, so raw maps and
/// profile files use the same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "returnOnEquity")]
    ReturnOnEquity,
    #[serde(rename = "debtToEquity")]
    DebtToEquity,
    #[serde(rename = "profitMargins")]
    ProfitMargin,
    /// Quarterly EPS growth.
    #[serde(rename = "earningsQuarterlyGrowth")]
    EpsGrowth,
    #[serde(rename = "forwardPE")]
    ForwardPe,
    #[serde(rename = "operatingMargins")]
    OperatingMargin,
    #[serde(rename = "priceToBook")]
    PriceToBook,
    #[serde(rename = "freeCashflow")]
    FreeCashFlow,
    /// Five-year average dividend yield, read by the Lynch table as its
    /// five-year EPS growth proxy.
    #[serde(rename = "fiveYearAvgDividendYield")]
    FiveYearAvgDividendYield,
    #[serde(rename = "pegRatio")]
    PegRatio,
    #[serde(rename = "netCashPerShare")]
    NetCashPerShare,
    #[serde(rename = "dividendYield")]
    DividendYield,
    #[serde(rename = "payoutRatio")]
    PayoutRatio,
    #[serde(rename = "inventoryTurnover")]
    InventoryTurnover,
    #[serde(rename = "inventoryGrowth")]
    InventoryGrowth,
    /// Sales growth.
    #[serde(rename = "revenueGrowth")]
    RevenueGrowth,
    /// ROE × (1 − payout ratio).
    #[serde(rename = "sustainableGrowthRate")]
    SustainableGrowthRate,
    /// (EPS growth + dividend yield) / forward P/E.
    #[serde(rename = "pegy")]
    DividendAdjustedPeg,
}

impl Metric {
    /// Metrics read straight from the provider.
    pub const BASE: [Metric; 16] = [
        Metric::ReturnOnEquity,
        Metric::DebtToEquity,
        Metric::ProfitMargin,
        Metric::EpsGrowth,
        Metric::ForwardPe,
        Metric::OperatingMargin,
        Metric::PriceToBook,
        Metric::FreeCashFlow,
        Metric::FiveYearAvgDividendYield,
        Metric::PegRatio,
        Metric::NetCashPerShare,
        Metric::DividendYield,
        Metric::PayoutRatio,
        Metric::InventoryTurnover,
        Metric::InventoryGrowth,
        Metric::RevenueGrowth,
    ];

    pub const DERIVED: [Metric; 2] = [Metric::SustainableGrowthRate, Metric::DividendAdjustedPeg];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::ReturnOnEquity => "returnOnEquity",
            Metric::DebtToEquity => "debtToEquity",
            Metric::ProfitMargin => "profitMargins",
            Metric::EpsGrowth => "earningsQuarterlyGrowth",
            Metric::ForwardPe => "forwardPE",
            Metric::OperatingMargin => "operatingMargins",
            Metric::PriceToBook => "priceToBook",
            Metric::FreeCashFlow => "freeCashflow",
            Metric::FiveYearAvgDividendYield => "fiveYearAvgDividendYield",
            Metric::PegRatio => "pegRatio",
            Metric::NetCashPerShare => "netCashPerShare",
            Metric::DividendYield => "dividendYield",
            Metric::PayoutRatio => "payoutRatio",
            Metric::InventoryTurnover => "inventoryTurnover",
            Metric::InventoryGrowth => "inventoryGrowth",
            Metric::RevenueGrowth => "revenueGrowth",
            Metric::SustainableGrowthRate => "sustainableGrowthRate",
            Metric::DividendAdjustedPeg => "pegy",
        }
    }

    /// Look up a metric by provider key. Derived keys resolve too.
    pub fn from_key(key: &str) -> Option<Metric> {
        Self::BASE
            .iter()
            .chain(Self::DERIVED.iter())
            .copied()
            .find(|m| m.key() == key)
    }

    pub fn is_derived(&self) -> bool {
        Self::DERIVED.contains(self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of a single criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    Pass,
    Fail,
    /// A metric the criterion needs was missing.
    Unknown,
}

impl Tristate {
    /// `None` (could not evaluate) maps to `Unknown`.
    pub fn from_check(check: Option<bool>) -> Self {
        match check {
            Some(true) => Tristate::Pass,
            Some(false) => Tristate::Fail,
            None => Tristate::Unknown,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Tristate::Pass)
    }

    /// Label shown to users; unknown criteria render as "N/A", not "FAIL".
    pub fn to_label(&self) -> &'static str {
        match self {
            Tristate::Pass => "PASS",
            Tristate::Fail => "FAIL",
            Tristate::Unknown => "N/A",
        }
    }
}

/// Numeric comparison applied as `lhs <op> rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "<")]
    Below,
    #[serde(rename = ">")]
    Above,
}

impl Comparator {
    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::AtLeast => lhs >= rhs,
            Comparator::AtMost => lhs <= rhs,
            Comparator::Below => lhs < rhs,
            Comparator::Above => lhs > rhs,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::AtLeast => ">=",
            Comparator::AtMost => "<=",
            Comparator::Below => "<",
            Comparator::Above => ">",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One row of a scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub name: String,
    pub outcome: Tristate,
}

/// Scorecard for one (ticker, profile) pair.
///
/// `criteria` keeps the profile's declared rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub profile: String,
    pub ticker: String,
    pub criteria: Vec<CriterionOutcome>,
    pub min_passing: usize,
    pub passes: bool,
}

impl EvaluationResult {
    /// Build a scorecard; `passes` is `count(Pass) >= min_passing`.
    pub fn from_outcomes(
        profile: impl Into<String>,
        ticker: impl Into<String>,
        criteria: Vec<CriterionOutcome>,
        min_passing: usize,
    ) -> Self {
        let passed = criteria.iter().filter(|c| c.outcome.is_pass()).count();
        Self {
            profile: profile.into(),
            ticker: ticker.into(),
            criteria,
            min_passing,
            passes: passed >= min_passing,
        }
    }

    pub fn pass_count(&self) -> usize {
        self.count(Tristate::Pass)
    }

    pub fn unknown_count(&self) -> usize {
        self.count(Tristate::Unknown)
    }

    pub fn total(&self) -> usize {
        self.criteria.len()
    }

    pub fn outcome(&self, criterion: &str) -> Option<Tristate> {
        self.criteria
            .iter()
            .find(|c| c.name == criterion)
            .map(|c| c.outcome)
    }

    fn count(&self, state: Tristate) -> usize {
        self.criteria.iter().filter(|c| c.outcome == state).count()
    }
}
