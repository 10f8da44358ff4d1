use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::derived::{dividend_adjusted_peg, sustainable_growth_rate};
use crate::types::{normalize_ticker, Metric, RawMetrics};

/// Immutable, typed view of one ticker's metrics.
///
/// Only known values are stored; [`MetricSnapshot::get`] returns `None` for
/// everything else. Derived metrics are computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    ticker: String,
    fetched_at: DateTime<Utc>,
    values: BTreeMap<Metric, f64>,
}

impl MetricSnapshot {
    /// Build a snapshot from raw provider output. Never fails: missing,
    /// null and non-finite values all read as `None`, and keys outside the
    /// metric set are ignored.
    pub fn build(ticker: &str, raw: &RawMetrics) -> Self {
        let mut values = BTreeMap::new();

        for (key, value) in raw {
            let Some(metric) = Metric::from_key(key).filter(|m| !m.is_derived()) else {
                tracing::debug!("Ignoring unrecognised metric '{}' for {}", key, ticker);
                continue;
            };
            if let Some(v) = value.filter(|v| v.is_finite()) {
                values.insert(metric, v);
            }
        }

        let lookup = |m: Metric| values.get(&m).copied();
        let sgr = sustainable_growth_rate(lookup(Metric::ReturnOnEquity), lookup(Metric::PayoutRatio));
        let pegy = dividend_adjusted_peg(
            lookup(Metric::EpsGrowth),
            lookup(Metric::DividendYield),
            lookup(Metric::ForwardPe),
        );

        if let Some(v) = sgr.filter(|v| v.is_finite()) {
            values.insert(Metric::SustainableGrowthRate, v);
        }
        if let Some(v) = pegy.filter(|v| v.is_finite()) {
            values.insert(Metric::DividendAdjustedPeg, v);
        }

        Self {
            ticker: normalize_ticker(ticker),
            fetched_at: Utc::now(),
            values,
        }
    }

    /// Convenience for tests and fixtures: build from `(metric, value)` pairs.
    pub fn from_pairs(ticker: &str, pairs: &[(Metric, f64)]) -> Self {
        let raw: RawMetrics = pairs
            .iter()
            .map(|(m, v)| (m.key().to_string(), Some(*v)))
            .collect();
        Self::build(ticker, &raw)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    /// Number of metrics (base and derived) with a value.
    pub fn known_count(&self) -> usize {
        self.values.len()
    }

    pub fn return_on_equity(&self) -> Option<f64> {
        self.get(Metric::ReturnOnEquity)
    }

    pub fn debt_to_equity(&self) -> Option<f64> {
        self.get(Metric::DebtToEquity)
    }

    pub fn sustainable_growth_rate(&self) -> Option<f64> {
        self.get(Metric::SustainableGrowthRate)
    }

    pub fn dividend_adjusted_peg(&self) -> Option<f64> {
        self.get(Metric::DividendAdjustedPeg)
    }
}
