//! Investor philosophies as data: named criteria over a [`MetricSnapshot`]
//! plus a minimum number of criteria that must pass.
//!
//! [`MetricSnapshot`]: screener_core::MetricSnapshot

pub mod builtin;
pub mod criterion;
pub mod file;
pub mod profile;
pub mod registry;

#[cfg(test)]
mod tests;

pub use builtin::{buffett, builtin_profiles, munger, peter_lynch};
pub use criterion::{CriterionRule, Predicate};
pub use file::{load_profiles, parse_profiles, CriterionDefinition, ProfileDefinition, ProfileFile};
pub use profile::InvestorProfile;
pub use registry::ProfileRegistry;
