//! Instructions and output schema sent to the vision model.

use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = "You are an expert food translator and culinary guide. \
You read photographs of restaurant menus written in any language and turn them into \
structured data for travellers. Be faithful to what is printed; never invent dishes.";

pub fn build_user_prompt(target_currency: &str) -> String {
    format!(
        r#"Read every dish on this menu photo and return it as JSON.

For each dish provide:
- name: the dish name as printed, in the original language
- english_name: an English translation of the name
- description: one or two sentences in English explaining what the dish is
- original_text: the full menu line exactly as printed
- pronunciation: a simple English phonetic spelling of the original name
- price: the price exactly as printed, including its currency symbol ("" if none)

Also provide:
- source_language: the language of the menu, in English (e.g. "Spanish")
- country: the most likely country of the restaurant, or null if unclear
- original_currency: the ISO 4217 code of the currency used on the menu
- exchange_rate_to_eur: your best estimate of how many {target_currency} one unit of original_currency is worth
- target_currency: "{target_currency}"

Only include items that are actually dishes or drinks."#
    )
}

/// Strict JSON schema for the `response_format` of the chat completion.
pub fn response_schema() -> Value {
    let string = json!({"type": "string"});
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "source_language",
            "country",
            "original_currency",
            "exchange_rate_to_eur",
            "target_currency",
            "dishes"
        ],
        "properties": {
            "source_language": string,
            "country": {"type": ["string", "null"]},
            "original_currency": string,
            "exchange_rate_to_eur": {"type": "number"},
            "target_currency": string,
            "dishes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": [
                        "name",
                        "english_name",
                        "description",
                        "original_text",
                        "pronunciation",
                        "price"
                    ],
                    "properties": {
                        "name": string,
                        "english_name": string,
                        "description": string,
                        "original_text": string,
                        "pronunciation": string,
                        "price": string
                    }
                }
            }
        }
    })
}
