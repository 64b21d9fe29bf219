//! Google Sheets REST API client.
//!
//! Production-grade client with:
//! - Token caching with refresh margin
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter
//! - Observability (tracing spans, metrics)

use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::CustomServiceAccount;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{parse_retry_after, SheetsError, SheetsResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::token_cache::{TokenCache, TokenSource};
use crate::types::{BatchUpdateValuesRequest, BatchUpdateValuesResponse, ValueRange};

/// Public Sheets v4 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

// =============================================================================
// Configuration
// =============================================================================

/// Sheets client configuration.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet id (the `SHEET_KEY`)
    pub spreadsheet_id: String,
    /// API root, overridable for tests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl SheetsConfig {
    /// Config with defaults for a spreadsheet id.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> SheetsResult<Self> {
        let spreadsheet_id = std::env::var("SHEET_KEY")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if spreadsheet_id.is_empty() {
            return Err(SheetsError::config_error(
                "SHEET_KEY must be set to the id of the queue spreadsheet",
            ));
        }

        let timeout_secs: u64 = std::env::var("SHEETS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("SHEETS_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let base_url = std::env::var("SHEETS_API_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            spreadsheet_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

/// Resolve credentials from the environment.
///
/// Order: inline service-account JSON (`GOOGLE_CREDENTIALS`), a key file
/// (`GOOGLE_APPLICATION_CREDENTIALS`), then a pre-issued bearer token
/// (`SHEETS_ACCESS_TOKEN`).
pub fn token_source_from_env() -> SheetsResult<TokenSource> {
    if let Some(json) = non_empty_env("GOOGLE_CREDENTIALS") {
        let sa = CustomServiceAccount::from_json(&json).map_err(|e| {
            SheetsError::auth_error(format!("Invalid GOOGLE_CREDENTIALS service account: {}", e))
        })?;
        return Ok(TokenSource::Provider(Arc::new(sa)));
    }

    if non_empty_env("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        let sa = CustomServiceAccount::from_env().map_err(|e| {
            SheetsError::auth_error(format!("Failed to load service account: {}", e))
        })?;
        if let Some(sa) = sa {
            return Ok(TokenSource::Provider(Arc::new(sa)));
        }
    }

    if let Some(token) = non_empty_env("SHEETS_ACCESS_TOKEN") {
        return Ok(TokenSource::Static(token));
    }

    Err(SheetsError::config_error(
        "No Sheets credentials found. Set GOOGLE_CREDENTIALS to the service account JSON, \
         GOOGLE_APPLICATION_CREDENTIALS to its path, or SHEETS_ACCESS_TOKEN.",
    ))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Client
// =============================================================================

/// Sheets REST API client bound to one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    config: SheetsConfig,
    token_cache: Arc<TokenCache>,
}

impl SheetsClient {
    /// Create a client with credentials from the environment.
    pub async fn new(config: SheetsConfig) -> SheetsResult<Self> {
        let source = token_source_from_env()?;
        Self::with_token_source(config, source)
    }

    /// Create a client with explicit credentials.
    pub fn with_token_source(config: SheetsConfig, source: TokenSource) -> SheetsResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("tsync-sheets/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SheetsError::Network)?;

        Ok(Self {
            http,
            config,
            token_cache: Arc::new(TokenCache::new(source)),
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> SheetsResult<Self> {
        let config = SheetsConfig::from_env()?;
        Self::new(config).await
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.config.base_url,
            urlencoding::encode(&self.config.spreadsheet_id)
        )
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Read every value in a range, row-major, rendered as strings.
    pub async fn read_values(&self, range: &str) -> SheetsResult<Vec<Vec<String>>> {
        let url = format!("{}/values/{}", self.spreadsheet_url(), urlencoding::encode(range));

        let op = with_retry(&self.config.retry, "read_values", || async {
            let response = self
                .send_authorized(|token| {
                    self.http
                        .get(&url)
                        .query(&[("majorDimension", "ROWS")])
                        .bearer_auth(token)
                })
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(Self::handle_error_response(status, &url, response).await);
            }

            let body: ValueRange = response.json().await?;
            Ok(body.into_rows())
        });

        self.execute_request("read_values", range, op).await
    }

    /// Write several ranges in one request.
    ///
    /// The API applies a batch as a unit: either every range is written or
    /// the request fails.
    pub async fn batch_update(&self, data: Vec<ValueRange>) -> SheetsResult<BatchUpdateValuesResponse> {
        let url = format!("{}/values:batchUpdate", self.spreadsheet_url());
        let ranges = data
            .iter()
            .filter_map(|vr| vr.range.as_deref())
            .collect::<Vec<_>>()
            .join(",");
        let body = BatchUpdateValuesRequest::raw(data);

        let op = with_retry(&self.config.retry, "batch_update", || async {
            let response = self
                .send_authorized(|token| self.http.post(&url).bearer_auth(token).json(&body))
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(Self::handle_error_response(status, &url, response).await);
            }

            let parsed: BatchUpdateValuesResponse = response.json().await?;
            Ok(parsed)
        });

        self.execute_request("batch_update", &ranges, op).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Send a request, refreshing the token once on 401.
    async fn send_authorized<F>(&self, build: F) -> SheetsResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token_cache.get_token().await?;
        let response = build(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED || !self.token_cache.can_refresh() {
            return Ok(response);
        }

        debug!("Sheets rejected access token, refreshing");
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;
        Ok(build(&token).send().await?)
    }

    async fn execute_request<T, F>(&self, operation: &str, range: &str, fut: F) -> SheetsResult<T>
    where
        F: std::future::Future<Output = SheetsResult<T>>,
    {
        let span = info_span!("sheets_request", operation = %operation, range = %range);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> SheetsError {
        let retry_after = parse_retry_after(
            response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response.text().await.unwrap_or_default();
        SheetsError::from_http_status_with_retry_after(
            status.as_u16(),
            format!("{} failed: {}", url, body),
            retry_after,
        )
    }
}
