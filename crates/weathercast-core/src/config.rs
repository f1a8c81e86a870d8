use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use url::Url;

use crate::credentials::CredentialSource;
use crate::error::ConfigError;

/// Name under which the weather API key is looked up in a credential source.
pub const API_KEY_CREDENTIAL: &str = "OPENWEATHER_API_KEY";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "WEATHERCAST_CONFIG";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Address lookup settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Background cache warming
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, e.g. "127.0.0.1" or "0.0.0.0"
    pub bind_address: String,

    /// TCP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Parse the configured address and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("bind address {}", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeatherMap data API
    #[serde(default = "default_weather_api_url")]
    pub api_base_url: String,

    /// API key. The OPENWEATHER_API_KEY credential takes precedence when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Timeout applied to every upstream request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a fetched record stays in the cache
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

fn default_weather_api_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_minutes() -> u32 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_weather_api_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl WeatherConfig {
    /// Resolve the API key: the credential source wins over the config file.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self, credentials: &dyn CredentialSource) -> Option<String> {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty()).then_some(key)
        };

        credentials
            .get(API_KEY_CREDENTIAL)
            .and_then(non_blank)
            .or_else(|| self.api_key.clone().and_then(non_blank))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible search service
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("Weathercast/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Postal codes submitted to the refresh queue at startup
    #[serde(default)]
    pub warm_postal_codes: Vec<String>,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if it
    /// doesn't exist yet.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.bind_address.parse::<IpAddr>().is_err() {
            result.add_error(
                "server.bind_address",
                format!("Not an IP address: {}", self.server.bind_address),
            );
        }
        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(&self.geocoder.base_url, "geocoder.base_url", &mut result);

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.weather.cache_ttl_minutes == 0 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Caching disabled (0 minutes)",
            );
        }

        if self.geocoder.user_agent.trim().is_empty() {
            result.add_error("geocoder.user_agent", "User agent cannot be blank");
        }

        if self
            .refresh
            .warm_postal_codes
            .iter()
            .any(|code| code.trim().is_empty())
        {
            result.add_warning(
                "refresh.warm_postal_codes",
                "Blank postal codes will be skipped",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(explicit));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weathercast");

        Ok(config_dir.join("config.toml"))
    }
}
