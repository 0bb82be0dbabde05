//! Configuration loading: TOML file with environment variable overrides.
//!
//! The file path comes from the first command-line argument, then
//! `GREENCUE_CONFIG`, then `greencue.toml` in the working directory. Every
//! field has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use serde::Deserialize;

use greencue_adapter_mqtt::MqttConfig;

const DEFAULT_CONFIG_PATH: &str = "greencue.toml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Latest-value cache settings.
    pub cache: CacheConfig,
    /// Realtime broadcast settings.
    pub broadcast: BroadcastConfig,
    /// Device transport settings.
    pub mqtt: MqttConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep the latest reading per sensor type in memory.
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Messages buffered per realtime subscriber.
    pub capacity: usize,
}

impl Config {
    /// Load configuration from the file named on the command line,
    /// `GREENCUE_CONFIG` or `greencue.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if
    /// an override is malformed, or if the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("GREENCUE_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("GREENCUE_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("GREENCUE_PORT") {
            self.server.port = parse_env("GREENCUE_PORT", &val)?;
        }
        if let Some(val) = var("GREENCUE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GREENCUE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = var("GREENCUE_CACHE_ENABLED") {
            self.cache.enabled = parse_env("GREENCUE_CACHE_ENABLED", &val)?;
        }
        if let Some(val) = var("GREENCUE_MQTT_ENABLED") {
            self.mqtt.enabled = parse_env("GREENCUE_MQTT_ENABLED", &val)?;
        }
        if let Some(val) = var("GREENCUE_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(val) = var("GREENCUE_MQTT_PORT") {
            self.mqtt.broker_port = parse_env("GREENCUE_MQTT_PORT", &val)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        let namespace = &self.mqtt.namespace;
        if namespace.is_empty()
            || namespace.contains(['+', '#'])
            || namespace.starts_with('/')
            || namespace.ends_with('/')
        {
            return Err(ConfigError::Validation(format!(
                "invalid mqtt namespace {namespace:?}"
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "log level must be one of {}",
                LOG_LEVELS.join("|")
            )));
        }
        if self.broadcast.capacity == 0 {
            return Err(ConfigError::Validation(
                "broadcast capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://greencue.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
