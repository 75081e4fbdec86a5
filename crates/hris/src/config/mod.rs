use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::notifications::channel::ChannelNames;
use crate::notifications::inbox::InboxPolicy;

const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 2_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub notifications: NotificationConfig,
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let notifications = NotificationConfig::from_env()?;
        let seed_file = non_empty_var("HRIS_SEED_FILE").map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            notifications,
            seed_file,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Channel naming, transport selection and inbox persistence for the notifier.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub channels: ChannelNames,
    /// Publish through Redis when set; otherwise the in-process broker is used.
    pub redis_url: Option<String>,
    pub publish_timeout: Duration,
    pub inbox_policy: InboxPolicy,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channels: ChannelNames::default(),
            redis_url: None,
            publish_timeout: Duration::from_millis(DEFAULT_PUBLISH_TIMEOUT_MS),
            inbox_policy: InboxPolicy::default(),
        }
    }
}

impl NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = ChannelNames::default();
        let shared = non_empty_var("HRIS_SHARED_CHANNEL").unwrap_or(defaults.shared);
        let private_prefix =
            non_empty_var("HRIS_PRIVATE_CHANNEL_PREFIX").unwrap_or(defaults.private_prefix);
        if shared.starts_with(&format!("{private_prefix}.")) {
            return Err(ConfigError::OverlappingChannels {
                shared,
                private_prefix,
            });
        }

        let publish_timeout = match non_empty_var("HRIS_PUBLISH_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidPublishTimeout)?,
            None => Duration::from_millis(DEFAULT_PUBLISH_TIMEOUT_MS),
        };

        let inbox_policy = match non_empty_var("HRIS_INBOX_POLICY") {
            Some(raw) => InboxPolicy::parse(&raw).ok_or(ConfigError::InvalidInboxPolicy(raw))?,
            None => InboxPolicy::default(),
        };

        Ok(Self {
            channels: ChannelNames {
                shared,
                private_prefix,
            },
            redis_url: non_empty_var("HRIS_REDIS_URL"),
            publish_timeout,
            inbox_policy,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPublishTimeout,
    InvalidInboxPolicy(String),
    OverlappingChannels {
        shared: String,
        private_prefix: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPublishTimeout => {
                write!(f, "HRIS_PUBLISH_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::InvalidInboxPolicy(value) => write!(
                f,
                "HRIS_INBOX_POLICY must be one of disabled, addressed, all (found '{value}')"
            ),
            ConfigError::OverlappingChannels {
                shared,
                private_prefix,
            } => write!(
                f,
                "shared channel '{shared}' collides with private prefix '{private_prefix}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
