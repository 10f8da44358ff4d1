use super::EvaluationEngine;
use investor_profiles::InvestorProfile;
use screener_core::{normalize_ticker, EvaluationResult, ProviderError};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result for one requested ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Evaluated {
        ticker: String,
        results: Vec<EvaluationResult>,
    },
    Failed {
        ticker: String,
        #[serde(serialize_with = "serialize_error")]
        error: ProviderError,
    },
}

fn serialize_error<S: Serializer>(error: &ProviderError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Evaluated { ticker, .. } | TickerOutcome::Failed { ticker, .. } => ticker,
        }
    }

    pub fn results(&self) -> Option<&[EvaluationResult]> {
        match self {
            TickerOutcome::Evaluated { results, .. } => Some(results.as_slice()),
            TickerOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            TickerOutcome::Evaluated { .. } => None,
            TickerOutcome::Failed { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One entry per distinct ticker, in request order
    pub entries: Vec<TickerOutcome>,
    /// Tickers as given, before blanks and duplicates are dropped
    pub total_requested: usize,
    pub total_evaluated: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &TickerOutcome> {
        self.entries.iter().filter(|e| e.error().is_some())
    }
}

/// Normalize, drop blanks and collapse duplicates while keeping first-seen order.
fn distinct_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let ticker = normalize_ticker(ticker.as_ref());
        if ticker.is_empty() {
            tracing::debug!("Skipping blank ticker in batch");
            continue;
        }
        if !seen.contains(&ticker) {
            seen.push(ticker);
        }
    }
    seen
}

impl EvaluationEngine {
    /// Evaluate many tickers concurrently. A failed ticker is recorded in the
    /// report and never aborts the rest of the batch.
    pub async fn evaluate_batch<S: AsRef<str>>(
        &self,
        tickers: &[S],
        profiles: &[InvestorProfile],
    ) -> BatchReport {
        let total_requested = tickers.len();
        let tickers = distinct_tickers(tickers);
        let distinct = tickers.len();

        tracing::info!(
            "Starting batch of {} tickers x {} profiles (concurrency {})",
            distinct,
            profiles.len(),
            self.concurrency
        );

        let profiles: Arc<[InvestorProfile]> = Arc::from(profiles);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, ticker) in tickers.iter().cloned().enumerate() {
            let engine = self.clone();
            let profiles = Arc::clone(&profiles);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = engine.evaluate(&ticker, &profiles).await;
                (index, ticker, result)
            });
        }

        let mut slots: Vec<Option<TickerOutcome>> = (0..distinct).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, ticker, Ok(results))) => {
                    slots[index] = Some(TickerOutcome::Evaluated { ticker, results });
                }
                Ok((index, ticker, Err(error))) => {
                    tracing::warn!("Failed to evaluate {}: {}", ticker, error);
                    slots[index] = Some(TickerOutcome::Failed { ticker, error });
                }
                Err(e) => {
                    tracing::error!("Batch task error: {}", e);
                }
            }
        }

        let entries: Vec<TickerOutcome> = slots
            .into_iter()
            .zip(tickers)
            .map(|(slot, ticker)| {
                slot.unwrap_or_else(|| TickerOutcome::Failed {
                    ticker,
                    error: ProviderError::Unavailable("evaluation task aborted".to_string()),
                })
            })
            .collect();

        let total_evaluated = entries.iter().filter(|e| e.results().is_some()).count();

        tracing::info!(
            "Batch complete: {}/{} tickers evaluated",
            total_evaluated,
            distinct
        );

        BatchReport {
            entries,
            total_requested,
            total_evaluated,
            timestamp: chrono::Utc::now(),
        }
    }
}
