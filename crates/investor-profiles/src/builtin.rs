use screener_core::{Comparator, ConfigError, Metric};

use crate::criterion::CriterionRule;
use crate::profile::InvestorProfile;

use Comparator::{Above, AtLeast, AtMost, Below};

/// Quality compounders at a fair price. 4 of 6.
pub fn buffett() -> Result<InvestorProfile, ConfigError> {
    InvestorProfile::new(
        "Buffett",
        vec![
            CriterionRule::threshold("roe", Metric::ReturnOnEquity, AtLeast, 0.15),
            CriterionRule::threshold("debt_to_equity", Metric::DebtToEquity, Below, 0.5),
            CriterionRule::threshold("profit_margin", Metric::ProfitMargin, AtLeast, 0.10),
            CriterionRule::threshold("eps_growth", Metric::EpsGrowth, AtLeast, 0.10),
            CriterionRule::threshold("forward_pe", Metric::ForwardPe, AtMost, 15.0),
            CriterionRule::threshold("sgr", Metric::SustainableGrowthRate, AtLeast, 0.10),
        ],
        4,
    )
}

/// Wide margins, cheap book, cash generation. 3 of 5.
pub fn munger() -> Result<InvestorProfile, ConfigError> {
    InvestorProfile::new(
        "Munger",
        vec![
            CriterionRule::threshold("operating_margin", Metric::OperatingMargin, AtLeast, 0.20),
            CriterionRule::threshold("price_to_book", Metric::PriceToBook, AtMost, 3.0),
            CriterionRule::threshold("debt_to_equity", Metric::DebtToEquity, Below, 0.5),
            CriterionRule::threshold("roe", Metric::ReturnOnEquity, AtLeast, 0.15),
            CriterionRule::threshold("free_cash_flow", Metric::FreeCashFlow, Above, 0.0),
        ],
        3,
    )
}

/// Growth at a reasonable price with a clean balance sheet. 6 of 10.
///
/// `eps_growth` reads the five-year average dividend yield (in percent, as
/// Yahoo publishes it) as its proxy and `eps_stability` reads quarterly EPS
/// growth; the data source publishes no multi-year EPS series.
pub fn peter_lynch() -> Result<InvestorProfile, ConfigError> {
    InvestorProfile::new(
        "Peter Lynch",
        vec![
            // Earnings
            CriterionRule::threshold("eps_growth", Metric::FiveYearAvgDividendYield, AtLeast, 0.10),
            CriterionRule::threshold("eps_stability", Metric::EpsGrowth, Below, 0.20),
            // Valuation
            CriterionRule::threshold("peg_ratio", Metric::PegRatio, Below, 1.0),
            CriterionRule::threshold("peg_y", Metric::DividendAdjustedPeg, AtLeast, 1.0),
            // Balance sheet
            CriterionRule::threshold("debt_to_equity", Metric::DebtToEquity, Below, 0.5),
            CriterionRule::threshold("net_cash_per_share", Metric::NetCashPerShare, Above, 0.0),
            // Dividends
            CriterionRule::threshold("dividend_yield", Metric::DividendYield, AtLeast, 0.02),
            CriterionRule::threshold("payout_ratio", Metric::PayoutRatio, Below, 0.6),
            // Operations
            CriterionRule::cross_field(
                "inventory_growth_vs_sales_growth",
                Metric::InventoryGrowth,
                Below,
                Metric::RevenueGrowth,
            ),
            CriterionRule::threshold("inventory_turnover", Metric::InventoryTurnover, Above, 6.0),
        ],
        6,
    )
}

/// The three built-in philosophies, in menu order.
pub fn builtin_profiles() -> Result<Vec<InvestorProfile>, ConfigError> {
    Ok(vec![buffett()?, munger()?, peter_lynch()?])
}
