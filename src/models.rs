use serde::{Deserialize, Serialize};

/// One line item on a translated menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDish {
    pub name: String,
    pub english_name: String,
    pub description: String,
    pub original_text: String,
    pub pronunciation: String,
    /// Display string as printed on the menu, e.g. "€15.50".
    pub price: String,
    /// Filled in lazily by `/api/fetch-images`, never by the translator.
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
}

/// Structured result of reading a menu photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTranslation {
    pub source_language: String,
    #[serde(default)]
    pub country: Option<String>,
    pub original_currency: String,
    /// Multiplier from `original_currency` to `target_currency`.
    /// The wire name is kept for the frontend.
    #[serde(rename = "exchange_rate_to_eur")]
    pub exchange_rate: f64,
    pub target_currency: String,
    pub dishes: Vec<MenuDish>,
}

impl MenuTranslation {
    /// Drop all image references; images are fetched out-of-band.
    pub fn without_images(mut self) -> Self {
        for dish in &mut self.dishes {
            dish.image_urls = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub emoji: String,
}

/// Uppercase and validate an ISO 4217 style code. Returns `None` unless it is three ASCII letters.
pub fn normalize_currency_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code)
    } else {
        None
    }
}
