use screener_core::{Comparator, Metric, MetricSnapshot, Tristate};
use std::fmt;

/// How a criterion decides. Every variant is a pure function of the snapshot.
#[derive(Clone, Copy)]
pub enum Predicate {
    /// `metric <comparator> value`
    Threshold {
        metric: Metric,
        comparator: Comparator,
        value: f64,
    },
    /// `left <comparator> right`, e.g. inventory growth below sales growth.
    CrossField {
        left: Metric,
        comparator: Comparator,
        right: Metric,
    },
    /// Arbitrary check. Must report `Unknown` itself when data is missing.
    Custom(fn(&MetricSnapshot) -> Tristate),
}

impl Predicate {
    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Tristate {
        match *self {
            Predicate::Threshold {
                metric,
                comparator,
                value,
            } => Tristate::from_check(snapshot.get(metric).map(|v| comparator.apply(v, value))),
            Predicate::CrossField {
                left,
                comparator,
                right,
            } => {
                let check = match (snapshot.get(left), snapshot.get(right)) {
                    (Some(l), Some(r)) => Some(comparator.apply(l, r)),
                    _ => None,
                };
                Tristate::from_check(check)
            }
            Predicate::Custom(check) => check(snapshot),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Threshold {
                metric,
                comparator,
                value,
            } => write!(f, "{} {} {}", metric, comparator, value),
            Predicate::CrossField {
                left,
                comparator,
                right,
            } => write!(f, "{} {} {}", left, comparator, right),
            Predicate::Custom(_) => f.write_str("custom"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named check within a profile.
#[derive(Debug, Clone)]
pub struct CriterionRule {
    name: String,
    predicate: Predicate,
}

impl CriterionRule {
    pub fn new(name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }

    pub fn threshold(name: impl Into<String>, metric: Metric, comparator: Comparator, value: f64) -> Self {
        Self::new(
            name,
            Predicate::Threshold {
                metric,
                comparator,
                value,
            },
        )
    }

    pub fn cross_field(name: impl Into<String>, left: Metric, comparator: Comparator, right: Metric) -> Self {
        Self::new(
            name,
            Predicate::CrossField {
                left,
                comparator,
                right,
            },
        )
    }

    pub fn custom(name: impl Into<String>, check: fn(&MetricSnapshot) -> Tristate) -> Self {
        Self::new(name, Predicate::Custom(check))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Metrics this rule reads. Empty for custom predicates.
    pub fn metrics(&self) -> Vec<Metric> {
        match self.predicate {
            Predicate::Threshold { metric, .. } => vec![metric],
            Predicate::CrossField { left, right, .. } => vec![left, right],
            Predicate::Custom(_) => Vec::new(),
        }
    }

    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Tristate {
        self.predicate.evaluate(snapshot)
    }
}
