use std::time::Duration;

use thiserror::Error;

use crate::service::{Palette, ServiceConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub enrichment: EnrichmentConfig,
    pub generator: GeneratorConfig,
    pub lookup: LookupConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub queue_capacity: usize,
    /// Percent of the longer text a pick edit must change to be re-enriched
    pub change_threshold_percent: u32,
    pub relay_interval_ms: u64,
    /// Comma separated hex colors for new topics; empty uses the built-in palette
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorBackend {
    Local,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackend,
    /// Required when backend is openai
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub enabled: bool,
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            change_threshold_percent: 20,
            relay_interval_ms: 5000,
            palette: Vec::new(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: GeneratorBackend::Local,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            enrichment: EnrichmentConfig::default(),
            generator: GeneratorConfig::default(),
            lookup: LookupConfig::default(),
            test_mode: false,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric setting. Unset or blank uses `default`; anything else
/// must parse.
fn parse_number<T: std::str::FromStr>(
    name: &str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            ConfigError::ValidationError(format!("{name} must be a number, got {value:?}"))
        }),
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    parse_number(name, std::env::var(name).ok().as_deref(), default)
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let http_timeout_ms = env_parse("HTTP_TIMEOUT_MS", defaults.generator.timeout_ms)?;

        let backend = match env_or("GENERATOR_BACKEND", "local").to_lowercase().as_str() {
            "local" => GeneratorBackend::Local,
            "openai" => GeneratorBackend::OpenAi,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown GENERATOR_BACKEND: {other}"
                )))
            }
        };

        let palette = std::env::var("TOPIC_PALETTE")
            .map(|p| {
                p.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let config = Config {
            server: ServerConfig {
                bind_address: env_or("BIND_ADDRESS", &defaults.server.bind_address),
                data_dir: env_or("DATA_DIR", &defaults.server.data_dir),
            },
            enrichment: EnrichmentConfig {
                queue_capacity: env_parse(
                    "ENRICHMENT_QUEUE_CAPACITY",
                    defaults.enrichment.queue_capacity,
                )?,
                change_threshold_percent: env_parse(
                    "ENRICHMENT_CHANGE_THRESHOLD",
                    defaults.enrichment.change_threshold_percent,
                )?,
                relay_interval_ms: env_parse(
                    "OUTBOX_RELAY_INTERVAL_MS",
                    defaults.enrichment.relay_interval_ms,
                )?,
                palette,
            },
            generator: GeneratorConfig {
                backend,
                openai_api_key: std::env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty()),
                openai_base_url: env_or("OPENAI_BASE_URL", &defaults.generator.openai_base_url),
                openai_model: env_or("OPENAI_MODEL", &defaults.generator.openai_model),
                timeout_ms: http_timeout_ms,
            },
            lookup: LookupConfig {
                enabled: env_flag("BOOK_LOOKUP_ENABLED", defaults.lookup.enabled),
                url: env_or("BOOK_LOOKUP_URL", &defaults.lookup.url),
                timeout_ms: http_timeout_ms,
            },
            test_mode: env_flag("TEST_MODE", false),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        if !(1..=100).contains(&self.enrichment.change_threshold_percent) {
            return Err(ConfigError::ValidationError(format!(
                "ENRICHMENT_CHANGE_THRESHOLD must be within 1..=100, got {}",
                self.enrichment.change_threshold_percent
            )));
        }

        if self.enrichment.relay_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "OUTBOX_RELAY_INTERVAL_MS must be positive".to_string(),
            ));
        }

        if self.generator.backend == GeneratorBackend::OpenAi
            && self.generator.openai_api_key.is_none()
        {
            return Err(ConfigError::ValidationError(
                "OPENAI_API_KEY is required when GENERATOR_BACKEND=openai".to_string(),
            ));
        }

        if self.test_mode {
            tracing::warn!("TEST_MODE is enabled; destructive admin routes are exposed");
        }

        Ok(())
    }

    pub fn relay_interval(&self) -> Duration {
        Duration::from_millis(self.enrichment.relay_interval_ms)
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_millis(self.generator.timeout_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup.timeout_ms)
    }

    /// Tunables handed to the book service
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            change_threshold_percent: f64::from(self.enrichment.change_threshold_percent),
            palette: Palette::new(self.enrichment.palette.clone()),
            ..ServiceConfig::default()
        }
    }
}
