//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `roomhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::net::IpAddr;

use chrono::TimeDelta;
use serde::Deserialize;

use roomhub_domain::token::TokenLifetimes;

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
    /// Token lifetimes.
    pub auth: AuthConfig,
    /// Superuser created at start-up when missing.
    pub admin: AdminConfig,
    /// Broker address seeded into the settings when none are stored.
    pub broker: BrokerConfig,
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
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Token lifetimes, in seconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

/// Bootstrap superuser credentials. Both or neither must be set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Broker settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// IP address of the MQTT broker.
    pub ip: Option<String>,
}

impl Config {
    /// Load configuration from `roomhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("roomhub.toml")?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ROOMHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ROOMHUB_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("ROOMHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ROOMHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ROOMHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("ROOMHUB_BROKER_IP") {
            self.broker.ip = Some(val);
        }
        if let Ok(val) = std::env::var("ROOMHUB_ADMIN_USERNAME") {
            self.admin.username = Some(val);
        }
        if let Ok(val) = std::env::var("ROOMHUB_ADMIN_PASSWORD") {
            self.admin.password = Some(val);
        }
    }

    /// Check the configuration for values the server cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.token_lifetimes()?;
        if self.admin.username.is_some() != self.admin.password.is_some() {
            return Err(ConfigError::Validation(
                "admin username and password must be set together".to_string(),
            ));
        }
        self.broker_ip()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Token lifetimes as durations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero or out-of-range lifetime.
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        Ok(TokenLifetimes {
            access: ttl("access_token_ttl_secs", self.auth.access_token_ttl_secs)?,
            refresh: ttl("refresh_token_ttl_secs", self.auth.refresh_token_ttl_secs)?,
        })
    }

    /// Bootstrap superuser credentials, when configured.
    #[must_use]
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        self.admin
            .username
            .as_deref()
            .zip(self.admin.password.as_deref())
    }

    /// Broker address to seed into the settings, when configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the address does not parse.
    pub fn broker_ip(&self) -> Result<Option<IpAddr>, ConfigError> {
        self.broker
            .ip
            .as_deref()
            .map(|ip| {
                ip.trim()
                    .parse()
                    .map_err(|_| ConfigError::Validation(format!("invalid broker ip: {ip}")))
            })
            .transpose()
    }
}

fn ttl(field: &str, secs: u64) -> Result<TimeDelta, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation(format!("{field} must be non-zero")));
    }
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| ConfigError::Validation(format!("{field} is out of range")))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:roomhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "roomhubd=info,roomhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: 5 * 60,
            refresh_token_ttl_secs: 24 * 60 * 60,
        }
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
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
