use anyhow::Result;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use menu_backend::build_app;
use menu_backend::config::Config;
use menu_backend::state::AppState;

/// Candidate config files, most specific first.
fn config_candidates() -> Vec<String> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
        exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn load_config() -> Result<Config> {
    for path in config_candidates() {
        if !std::path::Path::new(&path).exists() {
            debug!("No config at {}", path);
            continue;
        }
        let config = Config::load(&path)?;
        info!("Loaded configuration from: {}", path);
        return Ok(config);
    }

    warn!("No config file found, using built-in defaults");
    Ok(Config::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("menu_backend=info,tower_http=info")),
        )
        .init();

    let config = load_config()?;

    if config.translation_config.api_key.is_empty() {
        warn!("translation_config.api_key is empty; /api/translate will fail");
    }
    if config.image_search_config.api_key.is_empty() {
        warn!("image_search_config.api_key is empty; dishes will get no images");
    }

    let host: IpAddr = config.system_config.host.parse()?;
    let addr = SocketAddr::new(host, config.system_config.port);

    let app_state = AppState::new(config)?;
    let app = build_app(app_state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
