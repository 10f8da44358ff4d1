use async_trait::async_trait;

use crate::{ProviderError, RawMetrics};

/// Source of raw fundamental metrics for a ticker.
///
/// Implementations return whatever keys they know about; anything absent is
/// read as `None` when the snapshot is built. Retries, rate limiting and
/// timeouts live behind this boundary.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<RawMetrics, ProviderError>;

    fn name(&self) -> &'static str;
}
