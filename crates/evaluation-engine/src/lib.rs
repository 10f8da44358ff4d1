use investor_profiles::InvestorProfile;
use screener_core::{normalize_ticker, EvaluationResult, MetricSnapshot, MetricsProvider, ProviderError};
use std::sync::Arc;

pub mod batch;
pub use batch::{BatchReport, TickerOutcome};

const DEFAULT_CONCURRENCY: usize = 4;

/// Fetches one snapshot per ticker and scores it against a set of profiles.
///
/// Holds no caches and no retry logic; both belong to the provider.
#[derive(Clone)]
pub struct EvaluationEngine {
    provider: Arc<dyn MetricsProvider>,
    /// Max tickers in flight during a batch
    concurrency: usize,
}

impl EvaluationEngine {
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetch raw metrics and build the typed snapshot. Blank tickers are
    /// rejected before the provider is called.
    pub async fn fetch_snapshot(&self, ticker: &str) -> Result<MetricSnapshot, ProviderError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(ProviderError::NotFound(ticker));
        }

        let raw = self.provider.fetch(&ticker).await?;
        let snapshot = MetricSnapshot::build(&ticker, &raw);
        tracing::debug!(
            "{}: {} metrics known from {} provider",
            ticker,
            snapshot.known_count(),
            self.provider.name()
        );
        Ok(snapshot)
    }

    /// Evaluate one ticker against every profile, in the order given.
    /// The provider is called exactly once regardless of profile count.
    pub async fn evaluate(
        &self,
        ticker: &str,
        profiles: &[InvestorProfile],
    ) -> Result<Vec<EvaluationResult>, ProviderError> {
        tracing::info!("Evaluating {} against {} profiles", ticker.trim(), profiles.len());

        let snapshot = self.fetch_snapshot(ticker).await?;
        let results = self.evaluate_snapshot(&snapshot, profiles);

        tracing::info!(
            "{}: {}/{} profiles passed",
            snapshot.ticker(),
            results.iter().filter(|r| r.passes).count(),
            results.len()
        );
        Ok(results)
    }

    pub fn evaluate_snapshot(
        &self,
        snapshot: &MetricSnapshot,
        profiles: &[InvestorProfile],
    ) -> Vec<EvaluationResult> {
        profiles.iter().map(|p| p.evaluate(snapshot)).collect()
    }
}
