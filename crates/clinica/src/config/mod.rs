use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
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

        let base_url =
            env::var("APP_UPSTREAM_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        let upstream = UpstreamConfig::new(base_url, read_timeout()?)?;

        let session_file = env::var("APP_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".clinica-session.json"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            upstream,
            session: SessionConfig { file: session_file },
        })
    }
}

fn read_timeout() -> Result<Duration, ConfigError> {
    let raw = env::var("APP_UPSTREAM_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { value: raw }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the REST backend that owns schedules and exceptions.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Builds an upstream config, rejecting anything that is not an absolute http(s) URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(base_url.trim()).map_err(|_| {
            ConfigError::InvalidUpstreamUrl {
                value: base_url.clone(),
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUpstreamUrl { value: base_url });
        }

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

/// Where the CLI keeps the signed-in session between invocations.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub file: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUpstreamUrl { value: String },
    InvalidTimeout { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUpstreamUrl { value } => {
                write!(f, "APP_UPSTREAM_URL must be an http(s) URL, got '{value}'")
            }
            ConfigError::InvalidTimeout { value } => {
                write!(
                    f,
                    "APP_UPSTREAM_TIMEOUT_SECS must be a positive integer, got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidUpstreamUrl { .. }
            | ConfigError::InvalidTimeout { .. } => None,
        }
    }
}
