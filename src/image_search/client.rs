use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::interface::{ImageSearchError, ImageSearchInterface};
use crate::config::ImageSearchConfig;

/// Menu language name -> Brave `search_lang` code.
const SEARCH_LANGUAGES: &[(&str, &str)] = &[
    ("arabic", "ar"),
    ("basque", "eu"),
    ("bengali", "bn"),
    ("bulgarian", "bg"),
    ("catalan", "ca"),
    ("chinese", "zh-hans"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dutch", "nl"),
    ("english", "en"),
    ("estonian", "et"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("galician", "gl"),
    ("german", "de"),
    ("hebrew", "he"),
    ("hindi", "hi"),
    ("hungarian", "hu"),
    ("icelandic", "is"),
    ("italian", "it"),
    ("japanese", "jp"),
    ("korean", "ko"),
    ("latvian", "lv"),
    ("lithuanian", "lt"),
    ("malay", "ms"),
    ("norwegian", "nb"),
    ("polish", "pl"),
    ("portuguese", "pt-pt"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("serbian", "sr"),
    ("slovak", "sk"),
    ("slovenian", "sl"),
    ("spanish", "es"),
    ("swedish", "sv"),
    ("tamil", "ta"),
    ("thai", "th"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
    ("vietnamese", "vi"),
];

/// Resolve a display name or code to a Brave `search_lang`, `None` if unsupported.
fn search_lang(language: &str) -> Option<&'static str> {
    let language = language.trim().to_lowercase();
    SEARCH_LANGUAGES
        .iter()
        .find(|(name, code)| *name == language || *code == language)
        .map(|(_, code)| *code)
}

#[derive(Debug, Deserialize)]
struct BraveImageResponse {
    results: Option<Vec<BraveImageResult>>,
}

#[derive(Debug, Deserialize)]
struct BraveImageResult {
    properties: Option<BraveImageProperties>,
    thumbnail: Option<BraveThumbnail>,
}

#[derive(Debug, Deserialize)]
struct BraveImageProperties {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveThumbnail {
    src: Option<String>,
}

/// Brave image search with a process-lifetime cache keyed by (query, language).
pub struct BraveImageSearchClient {
    client: Client,
    base_url: String,
    max_results: u32,
    cache: DashMap<(String, String), Vec<String>>,
}

impl BraveImageSearchClient {
    pub fn new(config: &ImageSearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // API key is passed per call and never logged
        info!(
            "Initialized BraveImageSearchClient: base_url={}, max_results={}",
            config.base_url, config.max_results
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            cache: DashMap::new(),
        })
    }

    async fn fetch(
        &self,
        query: &str,
        language: &str,
        api_key: &str,
    ) -> Result<Vec<String>, ImageSearchError> {
        let url = format!("{}/images/search", self.base_url);
        let count = self.max_results.to_string();
        let mut params = vec![("q", query), ("count", count.as_str()), ("safesearch", "strict")];
        if let Some(lang) = search_lang(language) {
            params.push(("search_lang", lang));
        }

        debug!("Searching images: query_len={}, language={}", query.len(), language);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Image search request timed out");
                    return ImageSearchError::Timeout;
                }
                error!("Network error during image search: {}", e);
                ImageSearchError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Image search API error (status {})", status);
            return Err(ImageSearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: BraveImageResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse image search response: {}", e);
            ImageSearchError::InvalidResponse(format!("JSON parse error: {}", e))
        })?;

        let results = parsed.results.ok_or_else(|| {
            ImageSearchError::InvalidResponse("missing 'results' field".to_string())
        })?;

        let urls: Vec<String> = results
            .into_iter()
            .filter_map(|item| {
                item.properties
                    .and_then(|p| p.url)
                    .or_else(|| item.thumbnail.and_then(|t| t.src))
            })
            .filter(|url| !url.is_empty())
            .take(self.max_results as usize)
            .collect();

        info!("Image search returned {} image(s)", urls.len());
        Ok(urls)
    }
}

#[async_trait]
impl ImageSearchInterface for BraveImageSearchClient {
    async fn search_images(
        &self,
        query: &str,
        language: &str,
        api_key: &str,
    ) -> Result<Vec<String>, ImageSearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ImageSearchError::EmptyQuery);
        }

        let key = (query.to_string(), language.trim().to_string());
        if let Some(hit) = self.cache.get(&key) {
            debug!("Image search cache hit");
            return Ok(hit.clone());
        }

        if api_key.is_empty() {
            return Err(ImageSearchError::MissingApiKey);
        }

        let urls = self.fetch(query, language, api_key).await?;
        self.cache.insert(key, urls.clone());
        Ok(urls)
    }
}
