use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::currencies;
use super::interface::{ForexInterface, RateLookupError};
use crate::config::ForexConfig;
use crate::models::CurrencyInfo;

/// Base currency used to enumerate everything the provider quotes.
const LISTING_BASE: &str = "USD";

/// Client for an exchangerate-api style provider (`GET /latest/{BASE}`).
///
/// Successful lookups are memoized for the lifetime of the process. Two
/// requests racing on the same key may both hit the provider; the second
/// insert simply overwrites an identical value.
pub struct ForexClient {
    client: Client,
    base_url: String,
    rates: DashMap<(String, String), f64>,
    currency_codes: OnceCell<Vec<String>>,
}

impl ForexClient {
    pub fn new(config: &ForexConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Initialized ForexClient: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rates: DashMap::new(),
            currency_codes: OnceCell::new(),
        })
    }

    async fn fetch_rates(&self, base: &str) -> Result<Map<String, Value>, RateLookupError> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Fetching exchange rates from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Failed to fetch exchange rate: {}", e);
            RateLookupError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Exchange rate provider returned status {}", status);
            return Err(RateLookupError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Invalid exchange rate response: {}", e);
            RateLookupError::InvalidResponse(format!("body is not JSON: {}", e))
        })?;

        match body.get("rates") {
            Some(Value::Object(rates)) => Ok(rates.clone()),
            _ => {
                error!("Exchange rate response for {} has no rate map", base);
                Err(RateLookupError::InvalidResponse(
                    "missing 'rates' in exchange rate data".to_string(),
                ))
            }
        }
    }

    async fn supported_currency_codes(&self) -> Result<&Vec<String>, RateLookupError> {
        self.currency_codes
            .get_or_try_init(|| async {
                let rates = self.fetch_rates(LISTING_BASE).await?;
                let mut codes: Vec<String> = rates.keys().cloned().collect();
                codes.sort();
                info!("Loaded {} supported currencies", codes.len());
                Ok::<_, RateLookupError>(codes)
            })
            .await
    }
}

/// Pull a strictly positive rate for `to` out of a provider rate map.
fn extract_rate(rates: &Map<String, Value>, to: &str) -> Result<f64, RateLookupError> {
    let value = rates.get(to).ok_or_else(|| {
        RateLookupError::InvalidResponse(format!(
            "Currency {} not found in exchange rate data",
            to
        ))
    })?;

    let rate = value.as_f64().ok_or_else(|| {
        RateLookupError::InvalidResponse(format!("Non-numeric exchange rate for {}: {}", to, value))
    })?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(RateLookupError::InvalidResponse(format!(
            "Invalid exchange rate: {}",
            rate
        )));
    }

    Ok(rate)
}

#[async_trait]
impl ForexInterface for ForexClient {
    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<f64, RateLookupError> {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();

        if from == to {
            return Ok(1.0);
        }

        let key = (from, to);
        if let Some(rate) = self.rates.get(&key) {
            debug!("Exchange rate cache hit: {} -> {}", key.0, key.1);
            return Ok(*rate);
        }

        let rates = self.fetch_rates(&key.0).await?;
        let rate = extract_rate(&rates, &key.1).map_err(|e| {
            error!("{}", e);
            e
        })?;

        info!("Exchange rate {} -> {} = {}", key.0, key.1, rate);
        self.rates.insert(key, rate);
        Ok(rate)
    }

    async fn get_supported_currencies(&self) -> Result<Vec<CurrencyInfo>, RateLookupError> {
        let codes = self.supported_currency_codes().await?;
        Ok(codes.iter().map(|code| currencies::describe(code)).collect())
    }
}
