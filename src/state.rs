use std::sync::Arc;

use crate::config::Config;
use crate::forex::{ForexClient, ForexInterface};
use crate::image_search::{BraveImageSearchClient, ImageSearchInterface};
use crate::translation::{OpenAIMenuTranslator, TranslatorInterface};

/// Shared by every request. Nothing in here is mutated after startup
/// except the clients' own read-through caches.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<dyn TranslatorInterface>,
    pub image_search: Arc<dyn ImageSearchInterface>,
    pub forex: Arc<dyn ForexInterface>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let forex: Arc<dyn ForexInterface> = Arc::new(ForexClient::new(&config.forex_config)?);
        let translator = Arc::new(OpenAIMenuTranslator::new(
            &config.translation_config,
            forex.clone(),
        )?);
        let image_search = Arc::new(BraveImageSearchClient::new(&config.image_search_config)?);

        Ok(Self::with_services(config, translator, image_search, forex))
    }

    /// Build state around already constructed clients.
    pub fn with_services(
        config: Config,
        translator: Arc<dyn TranslatorInterface>,
        image_search: Arc<dyn ImageSearchInterface>,
        forex: Arc<dyn ForexInterface>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            translator,
            image_search,
            forex,
        }
    }
}
