use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::forex::RateLookupError;
use crate::models::MenuTranslation;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("could not read menu image: {0}")]
    Image(#[from] std::io::Error),

    #[error("request to translation model failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation model returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("translation model refused the request: {0}")]
    Refused(String),

    #[error("invalid translation response: {0}")]
    InvalidResponse(String),

    #[error("no dishes were recognized on the menu")]
    EmptyMenu,

    #[error("invalid exchange rate in translation: {0}")]
    InvalidExchangeRate(f64),

    #[error("currency conversion failed: {0}")]
    Currency(#[from] RateLookupError),
}

/// Reads a menu photo and returns it translated and structured.
///
/// Implementations do not retry; one upstream failure is one `TranslationError`.
#[async_trait]
pub trait TranslatorInterface: Send + Sync {
    async fn translate(
        &self,
        image_path: &Path,
        target_currency: &str,
        model: &str,
    ) -> Result<MenuTranslation, TranslationError>;
}
