use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::interface::{TranslationError, TranslatorInterface};
use super::prompt::{build_user_prompt, response_schema, SYSTEM_PROMPT};
use crate::config::TranslationConfig;
use crate::forex::ForexInterface;
use crate::models::{normalize_currency_code, MenuDish, MenuTranslation};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Menu as returned by the model. Every field except `country` must be present.
#[derive(Debug, Deserialize)]
struct MenuPayload {
    source_language: String,
    country: Option<String>,
    original_currency: String,
    exchange_rate_to_eur: f64,
    target_currency: String,
    dishes: Vec<DishPayload>,
}

#[derive(Debug, Deserialize)]
struct DishPayload {
    name: String,
    english_name: String,
    description: String,
    original_text: String,
    pronunciation: String,
    price: String,
}

impl From<DishPayload> for MenuDish {
    fn from(dish: DishPayload) -> Self {
        Self {
            name: dish.name,
            english_name: dish.english_name,
            description: dish.description,
            original_text: dish.original_text,
            pronunciation: dish.pronunciation,
            price: dish.price,
            image_urls: None,
        }
    }
}

/// Vision translator backed by an OpenAI compatible chat completions endpoint.
pub struct OpenAIMenuTranslator {
    client: Client,
    base_url: String,
    api_key: String,
    forex: Arc<dyn ForexInterface>,
}

impl OpenAIMenuTranslator {
    pub fn new(config: &TranslationConfig, forex: Arc<dyn ForexInterface>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Initialized OpenAIMenuTranslator: base_url={}, default_model={}",
            config.base_url, config.default_model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            forex,
        })
    }

    fn build_request_body(&self, model: &str, target_currency: &str, image_data_url: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": build_user_prompt(target_currency)},
                        {"type": "image_url", "image_url": {"url": image_data_url}}
                    ]
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "menu_translation",
                    "strict": true,
                    "schema": response_schema()
                }
            }
        })
    }

    async fn request_completion(&self, body: &Value) -> Result<String, TranslationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(text);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(format!("completion body: {}", e)))?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::InvalidResponse("no choices returned".to_string()))?
            .message;

        if let Some(refusal) = message.refusal {
            return Err(TranslationError::Refused(refusal));
        }

        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| TranslationError::InvalidResponse("empty message content".to_string()))
    }

    /// Rate from the menu's currency into the requested one, 1.0 when they match.
    async fn resolve_rate(&self, original: &str, target: &str) -> Result<f64, TranslationError> {
        if original == target {
            return Ok(1.0);
        }
        let rate = self.forex.get_exchange_rate(original, target).await?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(TranslationError::InvalidExchangeRate(rate));
        }
        Ok(rate)
    }
}

/// Deserialize and validate the model's JSON document. Rejects instead of defaulting.
fn parse_menu_payload(content: &str) -> Result<MenuPayload, TranslationError> {
    let payload: MenuPayload = serde_json::from_str(content)
        .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

    if payload.dishes.is_empty() {
        return Err(TranslationError::EmptyMenu);
    }
    if !payload.exchange_rate_to_eur.is_finite() || payload.exchange_rate_to_eur <= 0.0 {
        return Err(TranslationError::InvalidExchangeRate(payload.exchange_rate_to_eur));
    }
    if payload.source_language.trim().is_empty() {
        return Err(TranslationError::InvalidResponse(
            "source_language is empty".to_string(),
        ));
    }

    Ok(payload)
}

fn image_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl TranslatorInterface for OpenAIMenuTranslator {
    async fn translate(
        &self,
        image_path: &Path,
        target_currency: &str,
        model: &str,
    ) -> Result<MenuTranslation, TranslationError> {
        let target = target_currency.trim().to_ascii_uppercase();
        let bytes = tokio::fs::read(image_path).await?;
        info!(
            "Translating menu image ({} bytes) with model={}, target_currency={}",
            bytes.len(),
            model,
            target
        );

        let data_url = format!("data:{};base64,{}", image_mime_type(image_path), STANDARD.encode(&bytes));
        let body = self.build_request_body(model, &target, &data_url);

        let content = self.request_completion(&body).await.map_err(|e| {
            error!("Menu translation request failed: {}", e);
            e
        })?;
        debug!("Translation response length: {} chars", content.len());

        let payload = parse_menu_payload(&content)?;
        if !payload.target_currency.trim().eq_ignore_ascii_case(&target) {
            warn!(
                "Model reported target currency {} but {} was requested; using {}",
                payload.target_currency, target, target
            );
        }
        let original_currency = normalize_currency_code(&payload.original_currency).ok_or_else(|| {
            TranslationError::InvalidResponse(format!(
                "original_currency is not an ISO code: {}",
                payload.original_currency
            ))
        })?;

        let exchange_rate = self.resolve_rate(&original_currency, &target).await?;

        info!(
            "Translated {} dish(es) from {} ({} -> {} @ {})",
            payload.dishes.len(),
            payload.source_language,
            original_currency,
            target,
            exchange_rate
        );

        Ok(MenuTranslation {
            source_language: payload.source_language,
            country: payload.country,
            original_currency,
            exchange_rate,
            target_currency: target,
            dishes: payload.dishes.into_iter().map(MenuDish::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forex::RateLookupError;
    use crate::models::CurrencyInfo;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedForex {
        rate: Result<f64, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForexInterface for FixedForex {
        async fn get_exchange_rate(&self, _from: &str, _to: &str) -> Result<f64, RateLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rate
                .clone()
                .map_err(RateLookupError::InvalidResponse)
        }

        async fn get_supported_currencies(&self) -> Result<Vec<CurrencyInfo>, RateLookupError> {
            Ok(vec![])
        }
    }

    fn menu_json(original_currency: &str, rate: f64, dishes: Value) -> String {
        json!({
            "source_language": "Spanish",
            "country": "Spain",
            "original_currency": original_currency,
            "exchange_rate_to_eur": rate,
            "target_currency": "EUR",
            "dishes": dishes
        })
        .to_string()
    }

    fn paella() -> Value {
        json!([{
            "name": "Paella",
            "english_name": "Paella",
            "description": "Spanish rice dish.",
            "original_text": "Paella valenciana 15,50€",
            "pronunciation": "pie-AY-uh",
            "price": "€15.50"
        }])
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    fn menu_image() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]).unwrap();
        file
    }

    fn translator(server: &MockServer, forex: Arc<FixedForex>) -> OpenAIMenuTranslator {
        let config = TranslationConfig {
            base_url: server.uri(),
            api_key: "sk-test".to_string(),
            ..TranslationConfig::default()
        };
        OpenAIMenuTranslator::new(&config, forex).unwrap()
    }

    fn fixed_forex(rate: Result<f64, String>) -> Arc<FixedForex> {
        Arc::new(FixedForex {
            rate,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_translate_same_currency() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&menu_json("EUR", 1.0, paella()))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let rates = fixed_forex(Ok(2.0));
        let image = menu_image();
        let translation = translator(&server, rates.clone())
            .translate(image.path(), "eur", "gpt-4o-mini")
            .await
            .unwrap();

        assert_eq!(translation.source_language, "Spanish");
        assert_eq!(translation.country.as_deref(), Some("Spain"));
        assert_eq!(translation.target_currency, "EUR");
        assert_eq!(translation.exchange_rate, 1.0);
        assert_eq!(translation.dishes.len(), 1);
        assert!(translation.dishes[0].image_urls.is_none());
        assert_eq!(rates.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translate_resolves_rate_for_foreign_currency() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&menu_json("jpy", 0.5, paella()))),
            )
            .mount(&server)
            .await;

        let rates = fixed_forex(Ok(0.0061));
        let image = menu_image();
        let translation = translator(&server, rates.clone())
            .translate(image.path(), "EUR", "gpt-4o")
            .await
            .unwrap();

        assert_eq!(translation.original_currency, "JPY");
        assert_eq!(translation.exchange_rate, 0.0061);
        assert_eq!(rates.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_lookup_failure_is_translation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&menu_json("JPY", 0.5, paella()))),
            )
            .mount(&server)
            .await;

        let image = menu_image();
        let result = translator(&server, fixed_forex(Err("provider down".to_string())))
            .translate(image.path(), "EUR", "gpt-4o")
            .await;
        assert!(matches!(result, Err(TranslationError::Currency(_))));
    }

    #[tokio::test]
    async fn test_requested_currency_wins_over_reported() {
        let server = MockServer::start().await;
        // the model claims EUR while USD was asked for
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&menu_json("JPY", 0.5, paella()))),
            )
            .mount(&server)
            .await;

        let image = menu_image();
        let translation = translator(&server, fixed_forex(Ok(0.0067)))
            .translate(image.path(), "usd", "gpt-4o")
            .await
            .unwrap();
        assert_eq!(translation.target_currency, "USD");
        assert_eq!(translation.exchange_rate, 0.0067);
    }

    #[test]
    fn test_missing_target_currency_is_rejected() {
        let mut menu: Value = serde_json::from_str(&menu_json("EUR", 1.0, paella())).unwrap();
        menu.as_object_mut().unwrap().remove("target_currency");
        assert!(matches!(
            parse_menu_payload(&menu.to_string()),
            Err(TranslationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_dish_list_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&menu_json("EUR", 1.0, json!([])))),
            )
            .mount(&server)
            .await;

        let image = menu_image();
        let result = translator(&server, fixed_forex(Ok(1.0)))
            .translate(image.path(), "EUR", "gpt-4o")
            .await;
        assert!(matches!(result, Err(TranslationError::EmptyMenu)));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": {"message": "model overloaded"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let image = menu_image();
        let err = translator(&server, fixed_forex(Ok(1.0)))
            .translate(image.path(), "EUR", "gpt-4o")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
        assert!(matches!(err, TranslationError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "refusal": "I can't help with that."}}]
            })))
            .mount(&server)
            .await;

        let image = menu_image();
        let result = translator(&server, fixed_forex(Ok(1.0)))
            .translate(image.path(), "EUR", "gpt-4o")
            .await;
        assert!(matches!(result, Err(TranslationError::Refused(_))));
    }

    #[tokio::test]
    async fn test_missing_image_file() {
        let server = MockServer::start().await;
        let result = translator(&server, fixed_forex(Ok(1.0)))
            .translate(Path::new("/no/such/menu.jpg"), "EUR", "gpt-4o")
            .await;
        assert!(matches!(result, Err(TranslationError::Image(_))));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let dishes = json!([{"name": "Paella", "price": "€15.50"}]);
        let result = parse_menu_payload(&menu_json("EUR", 1.0, dishes));
        assert!(matches!(result, Err(TranslationError::InvalidResponse(_))));

        let no_rate = json!({"source_language": "Spanish", "original_currency": "EUR",
            "target_currency": "EUR", "dishes": paella()})
        .to_string();
        assert!(parse_menu_payload(&no_rate).is_err());
    }

    #[test]
    fn test_parse_rejects_non_positive_rate() {
        let result = parse_menu_payload(&menu_json("EUR", 0.0, paella()));
        assert!(matches!(result, Err(TranslationError::InvalidExchangeRate(_))));
        let result = parse_menu_payload(&menu_json("EUR", -3.0, paella()));
        assert!(matches!(result, Err(TranslationError::InvalidExchangeRate(_))));
    }

    #[test]
    fn test_parse_allows_null_country() {
        let content = json!({
            "source_language": "Thai",
            "country": null,
            "original_currency": "THB",
            "exchange_rate_to_eur": 0.025,
            "target_currency": "EUR",
            "dishes": paella()
        })
        .to_string();
        let payload = parse_menu_payload(&content).unwrap();
        assert!(payload.country.is_none());
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("a.PNG")), "image/png");
        assert_eq!(image_mime_type(Path::new("a.webp")), "image/webp");
        assert_eq!(image_mime_type(Path::new("a.jpeg")), "image/jpeg");
    }
}
