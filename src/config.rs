//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via the `-f` flag or the `GREENTHUMB_CONFIG` environment
//! variable.
//!
//! ## Loading priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `GREENTHUMB_`
//!
//! Nested values use double underscores: `GREENTHUMB_WEATHER__API_KEY=...`
//! sets `weather.api_key`.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "GREENTHUMB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Postcode assigned to the initial admin user (must be 5 digits)
    pub admin_post_code: String,
    /// Secret key for JWT signing (required for production)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Cache configuration (users listing and weather entries share one cache)
    pub cache: CacheConfig,
    /// Upstream weather provider configuration
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: DatabaseConfig::default(),
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
            admin_post_code: "75001".to_string(),
            secret_key: None,
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection URL; `mode=rwc` creates the file on first start
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://greenthumb.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Lifetime of issued JWT session tokens
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 3600),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached entries
    pub max_capacity: u64,
    /// How long a cached users listing stays fresh absent mutations
    #[serde(with = "humantime_serde")]
    pub users_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1024,
            users_ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Upstream weather endpoint (OpenWeatherMap-compatible)
    pub base_url: Url,
    /// API key passed as the `appid` query parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Unit system requested from the upstream
    pub units: String,
    /// Explicit upstream request timeout (the provider's default socket
    /// timeout is not relied upon)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How long weather responses are cached
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://api.openweathermap.org/data/2.5/weather").expect("default weather URL is valid"),
            api_key: None,
            units: "metric".to_string(),
            request_timeout: Duration::from_secs(8),
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file named by `args`, then apply
    /// `GREENTHUMB_`-prefixed environment overrides.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("GREENTHUMB_").split("__"))
            .extract()
    }
}
