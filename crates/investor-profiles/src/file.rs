use screener_core::{Comparator, ConfigError, Metric};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::criterion::CriterionRule;
use crate::profile::InvestorProfile;

/// Top-level shape of a profile file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    pub profiles: Vec<ProfileDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub name: String,
    pub min_passing: usize,
    pub criteria: Vec<CriterionDefinition>,
}

/// One criterion. Exactly one of `value` (threshold) or `other`
/// (cross-field comparison) must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionDefinition {
    pub name: String,
    pub metric: Metric,
    pub comparator: Comparator,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub other: Option<Metric>,
}

impl CriterionDefinition {
    fn into_rule(self, profile: &str) -> Result<CriterionRule, ConfigError> {
        match (self.value, self.other) {
            (Some(value), None) if value.is_finite() => Ok(CriterionRule::threshold(
                self.name,
                self.metric,
                self.comparator,
                value,
            )),
            (None, Some(other)) => Ok(CriterionRule::cross_field(
                self.name,
                self.metric,
                self.comparator,
                other,
            )),
            _ => Err(ConfigError::InvalidProfileFile(format!(
                "{}: criterion '{}' needs exactly one finite 'value' or one 'other' metric",
                profile, self.name
            ))),
        }
    }
}

impl ProfileDefinition {
    pub fn into_profile(self) -> Result<InvestorProfile, ConfigError> {
        let name = self.name;
        let criteria = self
            .criteria
            .into_iter()
            .map(|c| c.into_rule(&name))
            .collect::<Result<Vec<_>, _>>()?;
        InvestorProfile::new(name, criteria, self.min_passing)
    }
}

/// Parse and validate profiles from JSON text.
pub fn parse_profiles(json: &str) -> Result<Vec<InvestorProfile>, ConfigError> {
    let file: ProfileFile =
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidProfileFile(e.to_string()))?;
    file.profiles
        .into_iter()
        .map(ProfileDefinition::into_profile)
        .collect()
}

pub fn load_profiles(path: impl AsRef<Path>) -> Result<Vec<InvestorProfile>, ConfigError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::InvalidProfileFile(format!("{}: {}", path.display(), e)))?;
    let profiles = parse_profiles(&json)?;
    tracing::info!("Loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}
