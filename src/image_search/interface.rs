use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageSearchError {
    #[error("Image search API key is not configured")]
    MissingApiKey,

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Image search request timed out")]
    Timeout,

    #[error("Network error during image search: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image search API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from image search API: {0}")]
    InvalidResponse(String),
}

/// Image search keyed by dish name and menu language
#[async_trait]
pub trait ImageSearchInterface: Send + Sync {
    /// Ordered image URLs for `query`. An empty list is a valid answer.
    ///
    /// # Arguments
    /// * `query` - Dish name as printed on the menu
    /// * `language` - Menu language, either a display name ("Spanish") or a code ("es")
    /// * `api_key` - Provider key; never logged
    async fn search_images(
        &self,
        query: &str,
        language: &str,
        api_key: &str,
    ) -> Result<Vec<String>, ImageSearchError>;
}
