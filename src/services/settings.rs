use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::types::Credential;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub app: AppInfo,
    pub logging: LoggingConfig,
    pub demo_mode: bool,              // serve canned responses when no key is configured
    pub cors_origins: Vec<String>,    // ["*"] allows any origin
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub max_upload_bytes: usize,      // decoded image size, for either upload route
    pub shutdown_timeout_secs: u64,
    pub static_dir: Option<String>,   // directory holding index.html
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<Credential>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<String>,      // daily rolling file when set
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            app: AppInfo::default(),
            logging: LoggingConfig::default(),
            demo_mode: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            max_upload_bytes: 10 * 1024 * 1024,
            shutdown_timeout_secs: 10,
            static_dir: Some("static".to_string()),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            request_timeout_secs: 60,
        }
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "AI Image Analyzer".to_string(),
            version: "1.0.0".to_string(),
            description: "Analyze images using Google Gemini AI".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides using `lookup` as the variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = lookup("DEBUG") {
            self.server.debug = parse_bool("DEBUG", &v)?;
        }
        if let Some(v) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = lookup("STATIC_DIR") {
            self.server.static_dir = Some(v);
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(Credential::from(v));
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            self.gemini.model = v;
        }
        if let Some(v) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = v;
        }
        if let Some(v) = lookup("GEMINI_TIMEOUT_SECS") {
            self.gemini.request_timeout_secs = parse_env("GEMINI_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DEMO_MODE") {
            self.demo_mode = parse_bool("DEMO_MODE", &v)?;
        }
        if let Some(v) = lookup("APP_NAME") {
            self.app.name = v;
        }
        if let Some(v) = lookup("APP_VERSION") {
            self.app.version = v;
        }
        if let Some(v) = lookup("APP_DESCRIPTION") {
            self.app.description = v;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("LOG_DIR") {
            self.logging.log_dir = Some(v);
        }
        if let Some(v) = lookup("SHUTDOWN_TIMEOUT_SECS") {
            self.server.shutdown_timeout_secs = parse_env("SHUTDOWN_TIMEOUT_SECS", &v)?;
        }
        self.normalize();
        Ok(())
    }

    /// Strips whitespace around the API key so the value checked at startup
    /// is the value sent upstream.
    pub fn normalize(&mut self) {
        self.gemini.api_key = self.gemini.api_key.as_ref().map(Credential::trimmed);
    }

    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, SettingsError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut cfg: AppConfig = serde_yaml::from_str(&content)?;
    cfg.normalize();
    Ok(cfg)
}

/// Loads the YAML file if it exists, falls back to defaults otherwise, then
/// layers the environment on top.
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<AppConfig, SettingsError> {
    let mut cfg = if path.as_ref().exists() {
        load_config(path)?
    } else {
        AppConfig::default()
    };
    cfg.apply_env_overrides()?;
    Ok(cfg)
}
