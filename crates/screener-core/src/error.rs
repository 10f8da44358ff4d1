use thiserror::Error;

/// Failures raised by a [`MetricsProvider`](crate::MetricsProvider).
///
/// A ticker the source knows about but has sparse data for is *not* an
/// error; those gaps surface as `None` metrics and `Unknown` criteria.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Ticker not found: {0}")]
    NotFound(String),

    #[error("Metrics provider unavailable: {0}")]
    Unavailable(String),
}

/// Invalid profile configuration. Raised when a profile is built, registered
/// or loaded from a file, never during evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Profile name must not be empty")]
    EmptyProfileName,

    #[error("Profile {profile}: criterion name must not be empty")]
    EmptyCriterionName { profile: String },

    #[error("Profile {profile}: duplicate criterion '{criterion}'")]
    DuplicateCriterion { profile: String, criterion: String },

    #[error("Profile {profile}: min_passing {min_passing} exceeds {rules} criteria")]
    MinPassingOutOfRange {
        profile: String,
        min_passing: usize,
        rules: usize,
    },

    #[error("Profile '{0}' is already registered")]
    DuplicateProfile(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid profile file: {0}")]
    InvalidProfileFile(String),
}
