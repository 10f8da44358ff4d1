//! Derived metrics. Every function returns `None` when any input is `None`
//! or the computation would divide by zero.

/// Sustainable growth rate: ROE × (1 − payout ratio).
pub fn sustainable_growth_rate(return_on_equity: Option<f64>, payout_ratio: Option<f64>) -> Option<f64> {
    let (roe, payout) = (return_on_equity?, payout_ratio?);
    Some(roe * (1.0 - payout))
}

/// Dividend-adjusted PEG (PEGY): (EPS growth + dividend yield) / forward P/E.
pub fn dividend_adjusted_peg(
    eps_growth: Option<f64>,
    dividend_yield: Option<f64>,
    forward_pe: Option<f64>,
) -> Option<f64> {
    let (growth, dividend, pe) = (eps_growth?, dividend_yield?, forward_pe?);
    if pe == 0.0 {
        return None;
    }
    Some((growth + dividend) / pe)
}
