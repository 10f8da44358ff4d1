use anyhow::{Context, Result};
use evaluation_engine::{BatchReport, TickerOutcome};
use screener_core::EvaluationResult;
use serde::Serialize;

fn verdict(passes: bool) -> &'static str {
    if passes {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Detailed scorecard for one ticker: every criterion of every profile.
pub fn render_detailed(ticker: &str, results: &[EvaluationResult]) -> String {
    let mut out = format!("Results for {}:\n", ticker);

    for result in results {
        out.push_str(&format!("\n{} Results:\n", result.profile));
        out.push_str(&format!(
            "Overall: {} ({} of {} passed, {} required)\n",
            verdict(result.passes),
            result.pass_count(),
            result.total(),
            result.min_passing
        ));
        for criterion in &result.criteria {
            out.push_str(&format!(" - {}: {}\n", criterion.name, criterion.outcome.to_label()));
        }
    }
    out
}

/// One summary line per (ticker, profile); failed tickers show their error.
pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();

    for entry in &report.entries {
        out.push_str(&format!("{}:\n", entry.ticker()));
        match entry {
            TickerOutcome::Evaluated { results, .. } => {
                for result in results {
                    out.push_str(&format!(
                        "  {}: {} ({}/{})\n",
                        result.profile,
                        verdict(result.passes),
                        result.pass_count(),
                        result.total()
                    ));
                }
            }
            TickerOutcome::Failed { error, .. } => {
                out.push_str(&format!("  error: {}\n", error));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{} of {} tickers evaluated\n",
        report.total_evaluated,
        report.entries.len()
    ));
    out
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize results")
}
