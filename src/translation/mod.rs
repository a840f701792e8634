pub mod interface;
pub mod prompt;
pub mod client;

pub use interface::{TranslationError, TranslatorInterface};
pub use client::OpenAIMenuTranslator;
