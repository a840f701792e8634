use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub translation_config: TranslationConfig,
    #[serde(default)]
    pub image_search_config: ImageSearchConfig,
    #[serde(default)]
    pub forex_config: ForexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: u64,
    /// Where uploads live while they are being translated. Falls back to the OS temp dir.
    #[serde(default)]
    pub upload_dir: Option<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_size_mb() -> u64 {
    10
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl SystemConfig {
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }

    pub fn upload_path(&self) -> PathBuf {
        match &self.upload_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::temp_dir().join("menu-backend-uploads"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size_mb: default_max_upload_size_mb(),
            upload_dir: None,
            static_dir: default_static_dir(),
        }
    }
}

/// Vision model used to read and translate menus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_translation_timeout() -> u64 {
    120
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: String::new(),
            default_model: default_model(),
            default_currency: default_currency(),
            timeout_secs: default_translation_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    #[serde(default = "default_brave_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_image_search_timeout")]
    pub timeout_secs: u64,
}

fn default_brave_base_url() -> String {
    "https://api.search.brave.com/res/v1".to_string()
}

fn default_max_results() -> u32 {
    3
}

fn default_image_search_timeout() -> u64 {
    10
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_brave_base_url(),
            api_key: String::new(),
            max_results: default_max_results(),
            timeout_secs: default_image_search_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForexConfig {
    #[serde(default = "default_forex_base_url")]
    pub base_url: String,
    #[serde(default = "default_forex_timeout")]
    pub timeout_secs: u64,
}

fn default_forex_base_url() -> String {
    "https://api.exchangerate-api.com/v4".to_string()
}

fn default_forex_timeout() -> u64 {
    5
}

impl Default for ForexConfig {
    fn default() -> Self {
        Self {
            base_url: default_forex_base_url(),
            timeout_secs: default_forex_timeout(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let bytes = fs::read(path)?;
        // decode() strips a UTF-8 BOM if present
        let (content, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
        if had_errors {
            anyhow::bail!("Configuration file is not valid UTF-8: {}", path);
        }
        let content = substitute_env_vars(&content);

        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        }
    }
}

/// Replace `${VAR_NAME}` with the environment value. Unset variables become empty.
fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
