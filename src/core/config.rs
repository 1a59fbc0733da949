use crate::core::errors::ConfigError;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_API_URL: &str = "https://dictionary.yandex.net/api/v1/dicservice.json/";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
}

/// Remote dictionary API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Passed through to the remote API as-is; never checked locally
    pub api_key: String,
    pub base_url: String,
    /// `None` leaves the HTTP client's own defaults in place
    pub timeout: Option<Duration>,
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub cache_dir: String,
    /// When false the cache lives in memory and is lost on restart
    pub persist: bool,
    /// Delay between the first unsaved change and the background save
    pub save_interval: Duration,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| parse_level(&s))
            .unwrap_or(Level::INFO);

        let port = match env::var("SERVER_PORT") {
            Ok(s) => s
                .parse()
                .map_err(|_| ConfigError::EnvVarError(format!("SERVER_PORT={}", s)))?,
            Err(_) => 1420,
        };

        let timeout = match env::var("API_TIMEOUT_SECONDS") {
            Ok(s) => Some(Duration::from_secs(s.parse().map_err(|_| {
                ConfigError::EnvVarError(format!("API_TIMEOUT_SECONDS={}", s))
            })?)),
            Err(_) => None,
        };

        let save_interval = match env::var("CACHE_SAVE_INTERVAL_MS") {
            Ok(s) => Duration::from_millis(s.parse().map_err(|_| {
                ConfigError::EnvVarError(format!("CACHE_SAVE_INTERVAL_MS={}", s))
            })?),
            Err(_) => Duration::from_secs(1),
        };

        Ok(Self {
            server: ServerConfig {
                port,
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                log_level,
            },
            api: ApiConfig {
                api_key: env::var("DICTIONARY_API_KEY").unwrap_or_default(),
                base_url: env::var("DICTIONARY_API_URL")
                    .map(normalize_base_url)
                    .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                timeout,
            },
            cache: CacheConfig {
                cache_dir: env::var("CACHE_DIR").unwrap_or_else(|_| ".cache".to_string()),
                persist: env::var("CACHE_PERSIST")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
                save_interval,
            },
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // The API key is deliberately left unchecked: a missing or revoked key
        // only shows up as an upstream rejection.

        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::InvalidApiUrl {
                url: self.api.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: self.api.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        // Missing directories are created when the store opens
        if self.cache.persist {
            let cache_path = Path::new(&self.cache.cache_dir);
            if cache_path.exists() && !cache_path.is_dir() {
                return Err(ConfigError::InvalidCachePath(format!(
                    "Not a directory: {}",
                    cache_path.display()
                )));
            }
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn api_key(&self) -> &str {
        &self.api.api_key
    }

    pub fn api_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn api_timeout(&self) -> Option<Duration> {
        self.api.timeout
    }

    pub fn cache_dir(&self) -> &str {
        &self.cache.cache_dir
    }

    pub fn cache_persist(&self) -> bool {
        self.cache.persist
    }

    pub fn cache_save_interval(&self) -> Duration {
        self.cache.save_interval
    }

    /// File backing the persistent store
    pub fn cache_file(&self) -> PathBuf {
        Path::new(&self.cache.cache_dir).join("dictionary.json")
    }
}

fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Endpoint names are appended to the base, so it must end with a slash
fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{}/", url)
    }
}
