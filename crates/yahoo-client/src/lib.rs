use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use screener_core::{normalize_ticker, Metric, MetricsProvider, ProviderError, RawMetrics};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;


const QUERY_BASE_URL: &str = "https://query1.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const MODULES: &str = "financialData,defaultKeyStatistics,summaryDetail";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) investor-screener/0.1";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Connection settings for [`YahooClient`].
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base of the `query1`/`query2` API hosts.
    pub query_base_url: String,
    /// Page that hands out the session cookie the crumb is bound to.
    pub cookie_url: String,
    /// Requests per minute.
    pub rate_limit: usize,
    pub timeout: Duration,
    /// Wait after a 429 before retrying.
    pub retry_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            query_base_url: QUERY_BASE_URL.to_string(),
            cookie_url: COOKIE_URL.to_string(),
            rate_limit: 60,
            timeout: Duration::from_secs(30),
            retry_backoff: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

/// Yahoo Finance `quoteSummary` client.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    config: YahooConfig,
    crumb: Arc<Mutex<Option<String>>>,
    rate_limiter: RateLimiter,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.rate_limit, Duration::from_secs(60)),
            crumb: Arc::new(Mutex::new(None)),
            config,
        })
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        let request = builder
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let attempts = self.config.max_attempts.max(1);

        for attempt in 0..attempts {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| ProviderError::Unavailable("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            tracing::warn!(
                "Yahoo 429 rate limited, waiting {:.1}s before retry {}/{}",
                self.config.retry_backoff.as_secs_f64(),
                attempt + 1,
                attempts
            );
            tokio::time::sleep(self.config.retry_backoff).await;
        }

        Err(ProviderError::Unavailable(format!(
            "Rate limited by Yahoo after {} attempts",
            attempts
        )))
    }

    /// Cached crumb, fetched on first use.
    async fn crumb(&self) -> Result<String, ProviderError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.refresh_crumb().await?;
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn refresh_crumb(&self) -> Result<String, ProviderError> {
        // The cookie page answers 404 but still sets the session cookie.
        self.client
            .get(&self.config.cookie_url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Yahoo session cookie: {}", e)))?;

        let url = format!("{}/v1/test/getcrumb", self.config.query_base_url);
        let response = self.send_request(self.client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "Crumb HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let crumb = body.trim();
        if crumb.is_empty() || crumb.len() >= 100 || crumb.contains(char::is_whitespace) || crumb.contains('<') {
            return Err(ProviderError::Unavailable("Yahoo returned an invalid crumb".to_string()));
        }

        tracing::debug!("Obtained Yahoo session crumb");
        Ok(crumb.to_string())
    }

    /// Drop the cached crumb so the next request starts a new session.
    pub async fn invalidate_session(&self) {
        *self.crumb.lock().await = None;
    }

    /// `{base}/v10/finance/quoteSummary/{ticker}` with the ticker
    /// percent-encoded as a single path segment.
    fn summary_url(&self, ticker: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.config.query_base_url)
            .map_err(|e| ProviderError::Unavailable(format!("Invalid Yahoo base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("Yahoo base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary", ticker]);
        Ok(url)
    }

    async fn request_summary(&self, ticker: &str) -> Result<Response, ProviderError> {
        let crumb = self.crumb().await?;
        let url = self.summary_url(ticker)?;
        self.send_request(
            self.client
                .get(url)
                .query(&[("modules", MODULES), ("crumb", crumb.as_str())]),
        )
        .await
    }

    /// Fetch the fundamentals the screener needs, keyed by provider key.
    pub async fn get_quote_summary(&self, ticker: &str) -> Result<RawMetrics, ProviderError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(ProviderError::NotFound(ticker));
        }

        let mut response = self.request_summary(&ticker).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Yahoo rejected session for {}, refreshing crumb", ticker);
            self.invalidate_session().await;
            response = self.request_summary(&ticker).await?;
        }

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(ticker)),
            status => {
                return Err(ProviderError::Unavailable(format!(
                    "HTTP {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                )))
            }
        }

        let summary: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let metrics = summary.into_metrics(&ticker)?;
        tracing::debug!(
            "Yahoo returned {} of {} metrics for {}",
            metrics.values().filter(|v| v.is_some()).count(),
            FIELD_MAP.len(),
            ticker
        );
        Ok(metrics)
    }
}

#[async_trait]
impl MetricsProvider for YahooClient {
    async fn fetch(&self, ticker: &str) -> Result<RawMetrics, ProviderError> {
        self.get_quote_summary(ticker).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

#[derive(Debug, Clone, Copy)]
enum Module {
    FinancialData,
    DefaultKeyStatistics,
    SummaryDetail,
}

/// Where each metric lives, in lookup order, and the factor that converts
/// Yahoo's unit to ours. Yahoo reports debt/equity in percent. The five-year
/// average yield stays in Yahoo's percent units; the Lynch earnings proxy
/// compares it against 0.10 as published. Net cash per share, inventory
/// turnover and inventory growth are not published and stay absent.
const FIELD_MAP: &[(Metric, &[Module], f64)] = &[
    (Metric::ReturnOnEquity, &[Module::FinancialData], 1.0),
    (Metric::DebtToEquity, &[Module::FinancialData], 0.01),
    (Metric::ProfitMargin, &[Module::FinancialData, Module::DefaultKeyStatistics], 1.0),
    (Metric::EpsGrowth, &[Module::DefaultKeyStatistics], 1.0),
    (Metric::ForwardPe, &[Module::DefaultKeyStatistics, Module::SummaryDetail], 1.0),
    (Metric::OperatingMargin, &[Module::FinancialData], 1.0),
    (Metric::PriceToBook, &[Module::DefaultKeyStatistics], 1.0),
    (Metric::FreeCashFlow, &[Module::FinancialData], 1.0),
    (Metric::FiveYearAvgDividendYield, &[Module::SummaryDetail], 1.0),
    (Metric::PegRatio, &[Module::DefaultKeyStatistics], 1.0),
    (Metric::DividendYield, &[Module::SummaryDetail], 1.0),
    (Metric::PayoutRatio, &[Module::SummaryDetail], 1.0),
    (Metric::RevenueGrowth, &[Module::FinancialData], 1.0),
];

// Response structures
#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "financialData", default)]
    financial_data: Option<HashMap<String, serde_json::Value>>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<HashMap<String, serde_json::Value>>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<HashMap<String, serde_json::Value>>,
}

/// Yahoo wraps numbers as `{"raw": 0.15, "fmt": "15%"}` and uses `{}` for
/// missing values.
fn raw_number(value: &serde_json::Value) -> Option<f64> {
    value
        .get("raw")
        .and_then(serde_json::Value::as_f64)
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

impl QuoteSummaryResult {
    fn module(&self, module: Module) -> Option<&HashMap<String, serde_json::Value>> {
        match module {
            Module::FinancialData => self.financial_data.as_ref(),
            Module::DefaultKeyStatistics => self.default_key_statistics.as_ref(),
            Module::SummaryDetail => self.summary_detail.as_ref(),
        }
    }

    fn to_raw_metrics(&self) -> RawMetrics {
        FIELD_MAP
            .iter()
            .map(|(metric, modules, scale)| {
                let value = modules.iter().find_map(|m| {
                    self.module(*m)
                        .and_then(|fields| fields.get(metric.key()))
                        .and_then(raw_number)
                });
                (metric.key().to_string(), value.map(|v| v * scale))
            })
            .collect()
    }
}

impl QuoteSummaryResponse {
    fn into_metrics(self, ticker: &str) -> Result<RawMetrics, ProviderError> {
        let QuoteSummary { result, error } = self.quote_summary;

        if let Some(error) = error {
            let code = error.code.unwrap_or_default();
            let description = error.description.unwrap_or_default();
            if code.eq_ignore_ascii_case("not found") {
                return Err(ProviderError::NotFound(ticker.to_string()));
            }
            return Err(ProviderError::Unavailable(format!(
                "Yahoo error {}: {}",
                code, description
            )));
        }

        result
            .and_then(|results| results.into_iter().next())
            .map(|summary| summary.to_raw_metrics())
            .ok_or_else(|| ProviderError::NotFound(ticker.to_string()))
    }
}
