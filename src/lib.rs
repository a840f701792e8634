pub mod config;
pub mod error;
pub mod forex;
pub mod image_search;
pub mod models;
pub mod routes;
pub mod state;
pub mod translation;
pub mod upload;

use axum::{response::Response, Router};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use error::{error_response, UNEXPECTED_MESSAGE};
use state::AppState;

/// Full application router: routes plus the shared middleware stack.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes(&state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);
    error_response(axum::http::StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MESSAGE)
}
