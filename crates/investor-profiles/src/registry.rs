use screener_core::ConfigError;

use crate::builtin::builtin_profiles;
use crate::profile::InvestorProfile;

/// Ordered set of available profiles, keyed by display name.
///
/// Built explicitly and handed to the engine and the terminal shell.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<InvestorProfile>,
}

/// Name used for lookups: case-, space-, `_`- and `-`-insensitive, so
/// "Peter Lynch", "peter_lynch" and "PETERLYNCH" are the same profile.
fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with Buffett, Munger and Peter Lynch.
    pub fn with_builtins() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.register_all(builtin_profiles()?)?;
        Ok(registry)
    }

    pub fn register(&mut self, profile: InvestorProfile) -> Result<(), ConfigError> {
        if self.get(profile.name()).is_some() {
            return Err(ConfigError::DuplicateProfile(profile.name().to_string()));
        }
        tracing::debug!(
            "Registered profile {} ({} criteria, min {})",
            profile.name(),
            profile.criteria().len(),
            profile.min_passing()
        );
        self.profiles.push(profile);
        Ok(())
    }

    pub fn register_all(&mut self, profiles: Vec<InvestorProfile>) -> Result<(), ConfigError> {
        for profile in profiles {
            self.register(profile)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&InvestorProfile> {
        let key = lookup_key(name);
        self.profiles.iter().find(|p| lookup_key(p.name()) == key)
    }

    /// Display names in registration order, for menus.
    pub fn names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn profiles(&self) -> &[InvestorProfile] {
        &self.profiles
    }

    /// Resolve user-supplied names. `"all"` expands to every profile; an
    /// empty selection is treated the same way.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<InvestorProfile>, ConfigError> {
        if names.is_empty() || names.iter().any(|n| lookup_key(n.as_ref()) == "all") {
            return Ok(self.profiles.clone());
        }

        let mut selected: Vec<InvestorProfile> = Vec::with_capacity(names.len());
        for name in names {
            let profile = self
                .get(name.as_ref())
                .ok_or_else(|| ConfigError::UnknownProfile(name.as_ref().to_string()))?;
            if !selected.iter().any(|p| p.name() == profile.name()) {
                selected.push(profile.clone());
            }
        }
        Ok(selected)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
