use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::{normalize_ticker, MetricsProvider, ProviderError, RawMetrics};

/// In-memory metrics source.
///
/// Backs offline runs (`--metrics-file`) and tests. Fixture files are a JSON
/// object of ticker → { provider key → number | null }.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsProvider {
    metrics: HashMap<String, RawMetrics>,
}

impl StaticMetricsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, ticker: &str, raw: RawMetrics) -> Self {
        self.insert(ticker, raw);
        self
    }

    pub fn insert(&mut self, ticker: &str, raw: RawMetrics) {
        self.metrics.insert(normalize_ticker(ticker), raw);
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        let parsed: HashMap<String, RawMetrics> = serde_json::from_str(json)
            .map_err(|e| ProviderError::Unavailable(format!("invalid metrics fixture: {}", e)))?;

        let mut provider = Self::new();
        for (ticker, raw) in parsed {
            provider.insert(&ticker, raw);
        }
        Ok(provider)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let provider = Self::from_json_str(&json)?;
        tracing::info!("Loaded metrics for {} tickers from {}", provider.len(), path.display());
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[async_trait]
impl MetricsProvider for StaticMetricsProvider {
    async fn fetch(&self, ticker: &str) -> Result<RawMetrics, ProviderError> {
        let ticker = normalize_ticker(ticker);
        self.metrics
            .get(&ticker)
            .cloned()
            .ok_or(ProviderError::NotFound(ticker))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
