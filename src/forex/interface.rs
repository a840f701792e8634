use async_trait::async_trait;
use thiserror::Error;

use crate::models::CurrencyInfo;

/// Failure to obtain a usable rate or currency list from the rate provider.
#[derive(Debug, Error)]
pub enum RateLookupError {
    #[error("Failed to fetch exchange rate: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Exchange rate provider returned status {0}")]
    Status(u16),

    #[error("Invalid exchange rate response: {0}")]
    InvalidResponse(String),
}

/// Exchange rates and supported currencies
#[async_trait]
pub trait ForexInterface: Send + Sync {
    /// Multiplier converting an amount in `from` into `to`. Always > 0.
    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<f64, RateLookupError>;

    /// Every currency the provider quotes, sorted by code
    async fn get_supported_currencies(&self) -> Result<Vec<CurrencyInfo>, RateLookupError>;
}
