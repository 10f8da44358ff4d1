use screener_core::{ConfigError, CriterionOutcome, EvaluationResult, MetricSnapshot};
use std::collections::HashSet;

use crate::criterion::CriterionRule;

/// A named investing philosophy: ordered criteria plus a pass threshold.
///
/// Construction validates the configuration, so a profile that exists is
/// always safe to evaluate.
#[derive(Debug, Clone)]
pub struct InvestorProfile {
    name: String,
    criteria: Vec<CriterionRule>,
    min_passing: usize,
}

impl InvestorProfile {
    pub fn new(
        name: impl Into<String>,
        criteria: Vec<CriterionRule>,
        min_passing: usize,
    ) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyProfileName);
        }

        let mut seen = HashSet::new();
        for rule in &criteria {
            let criterion = rule.name().trim();
            if criterion.is_empty() {
                return Err(ConfigError::EmptyCriterionName { profile: name });
            }
            if !seen.insert(criterion) {
                return Err(ConfigError::DuplicateCriterion {
                    profile: name,
                    criterion: criterion.to_string(),
                });
            }
        }

        if min_passing > criteria.len() {
            return Err(ConfigError::MinPassingOutOfRange {
                profile: name,
                min_passing,
                rules: criteria.len(),
            });
        }

        Ok(Self {
            name,
            criteria,
            min_passing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criteria(&self) -> &[CriterionRule] {
        &self.criteria
    }

    pub fn min_passing(&self) -> usize {
        self.min_passing
    }

    /// Score a snapshot against every criterion, in declared order.
    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> EvaluationResult {
        let outcomes: Vec<CriterionOutcome> = self
            .criteria
            .iter()
            .map(|rule| {
                let outcome = rule.evaluate(snapshot);
                tracing::debug!(
                    "{} {} {} ({:?}): {}",
                    snapshot.ticker(),
                    self.name,
                    rule.name(),
                    rule.predicate(),
                    outcome.to_label()
                );
                CriterionOutcome {
                    name: rule.name().to_string(),
                    outcome,
                }
            })
            .collect();

        EvaluationResult::from_outcomes(&self.name, snapshot.ticker(), outcomes, self.min_passing)
    }
}
