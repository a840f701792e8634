pub mod interface;
pub mod client;

pub use interface::{ImageSearchError, ImageSearchInterface};
pub use client::BraveImageSearchClient;
