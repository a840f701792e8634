pub mod interface;
pub mod client;
pub mod currencies;

pub use interface::{ForexInterface, RateLookupError};
pub use client::ForexClient;
