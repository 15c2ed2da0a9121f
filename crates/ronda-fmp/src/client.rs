//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    retry::RetryPolicy,
    types::{BalanceSheet, CashFlowStatement, HistoricalPrice, IncomeStatement, Period},
};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use std::{env, time::Duration};
use tracing::debug;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Point the client at another server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether the key is FMP's public demo key, which only serves annual
    /// statements.
    #[must_use]
    pub fn is_demo_key(&self) -> bool {
        self.api_key.eq_ignore_ascii_case("demo")
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        format!("{}/{endpoint}{sep}apikey={}", self.base_url, self.api_key)
    }

    /// One GET request, parsed as JSON.
    async fn get_once<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FmpError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let text = response.text().await?;

        // Error payloads come back with a 200
        if text.contains("\"Error Message\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// GET with the client's retry policy.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "fmp request");
        self.retry.run(endpoint, || self.get_once(endpoint)).await
    }

    fn statement_endpoint(path: &str, symbol: &str, period: Period, limit: Option<u32>) -> String {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        format!(
            "{path}?symbol={}&period={}{limit_param}",
            symbol.to_uppercase(),
            period.as_str(),
        )
    }

    /// Get income statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<IncomeStatement>> {
        self.get(&Self::statement_endpoint("income-statement", symbol, period, limit))
            .await
    }

    /// Get balance sheets for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSheet>> {
        self.get(&Self::statement_endpoint(
            "balance-sheet-statement",
            symbol,
            period,
            limit,
        ))
        .await
    }

    /// Get cash flow statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn cash_flow(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<CashFlowStatement>> {
        self.get(&Self::statement_endpoint(
            "cash-flow-statement",
            symbol,
            period,
            limit,
        ))
        .await
    }

    /// Get historical daily prices for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HistoricalPrice>> {
        let mut params = String::new();
        if let Some(f) = from {
            params.push_str(&format!("&from={f}"));
        }
        if let Some(t) = to {
            params.push_str(&format!("&to={t}"));
        }

        let endpoint = format!(
            "historical-price-eod/full?symbol={}{}",
            symbol.to_uppercase(),
            params
        );
        // The stable API returns a flat array, not a wrapped response
        self.get(&endpoint).await
    }
}
