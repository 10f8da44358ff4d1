use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use yahoo_client::YahooConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    // Yahoo provider
    pub yahoo_rate_limit: usize,      // requests per minute
    pub yahoo_timeout_secs: u64,

    // Batch evaluation
    pub concurrency: usize,

    // Optional local data
    pub metrics_file: Option<PathBuf>,  // offline fixture instead of Yahoo
    pub profiles_file: Option<PathBuf>, // extra profiles on top of the built-ins
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            yahoo_rate_limit: env::var("YAHOO_RATE_LIMIT")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("YAHOO_RATE_LIMIT must be a positive integer")?,
            yahoo_timeout_secs: env::var("YAHOO_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("YAHOO_TIMEOUT_SECS must be a whole number of seconds")?,
            concurrency: env::var("SCREENER_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("SCREENER_CONCURRENCY must be a positive integer")?,
            metrics_file: optional_path("SCREENER_METRICS_FILE"),
            profiles_file: optional_path("SCREENER_PROFILES_FILE"),
        };

        Ok(config)
    }

    /// Run after CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        if self.yahoo_rate_limit == 0 {
            anyhow::bail!("YAHOO_RATE_LIMIT must be at least 1");
        }
        if self.yahoo_timeout_secs == 0 {
            anyhow::bail!("YAHOO_TIMEOUT_SECS must be at least 1");
        }
        if self.concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }
        Ok(())
    }

    pub fn yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            rate_limit: self.yahoo_rate_limit,
            timeout: Duration::from_secs(self.yahoo_timeout_secs),
            ..YahooConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ScreenerConfig {
        ScreenerConfig {
            yahoo_rate_limit: 60,
            yahoo_timeout_secs: 30,
            concurrency: 4,
            metrics_file: None,
            profiles_file: None,
        }
    }

    #[test]
    fn test_env_zero_concurrency_overridable() {
        // The only test in this crate that touches the process environment.
        env::set_var("SCREENER_CONCURRENCY", "0");
        let loaded = ScreenerConfig::from_env();
        env::remove_var("SCREENER_CONCURRENCY");

        let mut config = loaded.unwrap();
        assert_eq!(config.concurrency, 0);
        assert!(config.validate().is_err());

        config.concurrency = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ScreenerConfig {
            concurrency: 0,
            ..base()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Concurrency"));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = ScreenerConfig {
            yahoo_rate_limit: 0,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yahoo_config_carries_limits() {
        let config = ScreenerConfig {
            yahoo_rate_limit: 30,
            yahoo_timeout_secs: 10,
            ..base()
        };
        let yahoo = config.yahoo_config();
        assert_eq!(yahoo.rate_limit, 30);
        assert_eq!(yahoo.timeout, Duration::from_secs(10));
        assert_eq!(yahoo.max_attempts, 3);
    }
}
