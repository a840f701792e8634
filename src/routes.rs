use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::models::normalize_currency_code;
use crate::state::AppState;
use crate::upload::save_uploaded_image;

/// Multipart overhead allowed on top of the configured image size, so oversized
/// files reach the validator and get a descriptive error.
const MULTIPART_SLACK_BYTES: usize = 1024 * 1024;

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/400x300?text=";

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let system_config = &state.config.system_config;
    let upload_limit = system_config
        .max_upload_bytes()
        .saturating_add(MULTIPART_SLACK_BYTES);

    Router::new()
        // Landing page and health check
        .route("/", get(index))
        .route("/status", get(status))

        // REST API routes
        .route(
            "/api/translate",
            post(translate_menu).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/currencies", get(currencies))
        .route("/api/exchange-rate", get(exchange_rate))
        .route("/api/fetch-images", post(fetch_images))

        // Static file serving
        .nest_service("/static", ServeDir::new(&system_config.static_dir))
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../templates/index.html"))
}

async fn status() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

struct UploadedImage {
    bytes: Bytes,
    filename: String,
}

#[derive(Default)]
struct TranslateForm {
    image: Option<UploadedImage>,
    currency: Option<String>,
    model: Option<String>,
}

async fn read_translate_form(mut multipart: Multipart) -> Result<TranslateForm, ApiError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ApiError::bad_request(format!("Invalid upload: {}", e.body_text()))
    };

    let mut form = TranslateForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                form.image = Some(UploadedImage { bytes, filename });
            }
            Some("currency") => form.currency = Some(field.text().await.map_err(invalid)?),
            Some("model") => form.model = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }
    Ok(form)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Translate a menu photo. Dishes come back without images; the frontend
/// asks `/api/fetch-images` for those separately.
async fn translate_menu(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    // a request that is not multipart at all cannot carry an image
    let form = match multipart {
        Ok(multipart) => read_translate_form(multipart).await?,
        Err(_) => TranslateForm::default(),
    };

    let image = form
        .image
        .ok_or_else(|| ApiError::bad_request("No image file provided"))?;

    let translation_config = &state.config.translation_config;
    let target_currency = match non_blank(form.currency) {
        Some(raw) => normalize_currency_code(&raw)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid currency code: {}", raw)))?,
        None => translation_config.default_currency.clone(),
    };
    let model = non_blank(form.model).unwrap_or_else(|| translation_config.default_model.clone());

    let system_config = &state.config.system_config;
    // removed when `upload` goes out of scope, whatever the outcome below
    let upload = save_uploaded_image(
        &image.bytes,
        &image.filename,
        &system_config.upload_path(),
        system_config.max_upload_bytes(),
    )
    .await?;

    let translation = state
        .translator
        .translate(upload.path(), &target_currency, &model)
        .await
        .map_err(|e| {
            error!("Translation error: {}", e);
            ApiError::from(e)
        })?
        .without_images();

    info!(
        "Translated menu: {} dish(es), {} -> {}",
        translation.dishes.len(),
        translation.original_currency,
        translation.target_currency
    );

    Ok(Json(json!({
        "status": "success",
        "data": translation
    })))
}

async fn currencies(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let currencies = state.forex.get_supported_currencies().await.map_err(|e| {
        error!("Failed to load currencies: {}", e);
        ApiError::Upstream(format!("Failed to load currencies: {}", e))
    })?;

    Ok(Json(json!({
        "status": "success",
        "currencies": currencies
    })))
}

#[derive(Debug, Deserialize)]
struct ExchangeRateQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn exchange_rate(
    State(state): State<AppState>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Json<Value>, ApiError> {
    let from = query.from.unwrap_or_default().trim().to_uppercase();
    let to = query.to.unwrap_or_default().trim().to_uppercase();
    if from.is_empty() || to.is_empty() {
        return Err(ApiError::bad_request(
            "Missing 'from' or 'to' currency parameter",
        ));
    }

    // a bad rate lookup is almost always a bad currency code, so it is the caller's to fix
    let rate = state
        .forex
        .get_exchange_rate(&from, &to)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "rate": rate
    })))
}

#[derive(Debug, Deserialize)]
struct FetchImagesRequest {
    #[serde(default)]
    dishes: Vec<DishRef>,
    #[serde(default = "default_language")]
    language: String,
    /// Absent means true; an explicit null means false.
    #[serde(default = "default_include_images")]
    include_images: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct DishRef {
    #[serde(default)]
    name: Option<String>,
}

fn default_language() -> String {
    "English".to_string()
}

fn default_include_images() -> Option<bool> {
    Some(true)
}

/// The dish name goes in as-is apart from spaces and the characters that
/// would end or corrupt the `text` query value.
pub fn placeholder_url(dish_name: &str) -> String {
    let mut url = String::with_capacity(PLACEHOLDER_BASE.len() + dish_name.len());
    url.push_str(PLACEHOLDER_BASE);
    for c in dish_name.chars() {
        match c {
            ' ' => url.push('+'),
            '%' => url.push_str("%25"),
            '&' => url.push_str("%26"),
            '#' => url.push_str("%23"),
            '+' => url.push_str("%2B"),
            _ => url.push(c),
        }
    }
    url
}

/// Images for one dish: search results, a placeholder when there are none,
/// or `None` when the search itself failed.
async fn lookup_dish_images(state: &AppState, dish_name: &str, language: &str) -> Option<Vec<String>> {
    let api_key = &state.config.image_search_config.api_key;
    match state
        .image_search
        .search_images(dish_name, language, api_key)
        .await
    {
        Ok(urls) if !urls.is_empty() => Some(urls),
        Ok(_) => Some(vec![placeholder_url(dish_name)]),
        Err(e) => {
            warn!("Image search failed for '{}': {}", dish_name, e);
            None
        }
    }
}

async fn fetch_images(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let no_json = || ApiError::bad_request("No JSON data provided");

    let value: Value = serde_json::from_slice(&body).map_err(|_| no_json())?;
    match &value {
        Value::Object(map) if !map.is_empty() => {}
        _ => return Err(no_json()),
    }
    let request: FetchImagesRequest = serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;

    let mut names: Vec<String> = request
        .dishes
        .into_iter()
        .filter_map(|dish| dish.name)
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();

    let images: BTreeMap<String, Option<Vec<String>>> = if request.include_images.unwrap_or(false) {
        let lookups = names.into_iter().map(|name| {
            let state = &state;
            let language = request.language.as_str();
            async move {
                let urls = lookup_dish_images(state, &name, language).await;
                (name, urls)
            }
        });
        join_all(lookups).await.into_iter().collect()
    } else {
        names.into_iter().map(|name| (name, None)).collect()
    };

    Ok(Json(json!({
        "status": "success",
        "images": images
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_url() {
        assert_eq!(
            placeholder_url("Paella"),
            "https://via.placeholder.com/400x300?text=Paella"
        );
        assert_eq!(
            placeholder_url("Pad Thai"),
            "https://via.placeholder.com/400x300?text=Pad+Thai"
        );
        assert_eq!(
            placeholder_url("Crème brûlée & co"),
            "https://via.placeholder.com/400x300?text=Crème+brûlée+%26+co"
        );
        assert_eq!(
            placeholder_url("ラーメン"),
            "https://via.placeholder.com/400x300?text=ラーメン"
        );
        assert_eq!(
            placeholder_url("Fish+Chips #1 100%"),
            "https://via.placeholder.com/400x300?text=Fish%2BChips+%231+100%25"
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  usd ".to_string())), Some("usd".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_fetch_request_defaults() {
        let request: FetchImagesRequest =
            serde_json::from_value(json!({"dishes": [{"name": "Paella", "price": "€9"}, {}]})).unwrap();
        assert_eq!(request.language, "English");
        assert_eq!(request.include_images, Some(true));
        assert_eq!(request.dishes.len(), 2);
        assert!(request.dishes[1].name.is_none());
    }

    #[test]
    fn test_fetch_request_null_include_images() {
        let request: FetchImagesRequest =
            serde_json::from_value(json!({"dishes": [], "include_images": null})).unwrap();
        assert_eq!(request.include_images, None);
    }
}
