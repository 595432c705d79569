use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_FILE: &str = "applications.json";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage, taken from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: Option<String>) -> Self {
        match raw.as_deref().map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "prod" || value == "production" => Self::Production,
            Some(value) if value == "test" || value == "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the intake service reads from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(read("APP_ENV")),
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
        })
    }
}

fn read(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match read("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: read("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// `localhost` is accepted as an alias for the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost {
                    host: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Where submitted applications and their uploaded documents live on disk.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub upload_dir: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            data_file: path_setting("APP_DATA_FILE", DEFAULT_DATA_FILE)?,
            upload_dir: path_setting("APP_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)?,
        })
    }
}

fn path_setting(key: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    match read(key) {
        None => Ok(PathBuf::from(default)),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyPath { key }),
        Some(raw) => Ok(PathBuf::from(raw.trim())),
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl TelemetryConfig {
    fn from_env() -> Self {
        Self {
            log_level: read("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },
    EmptyPath {
        key: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{value}' is not a valid port number")
            }
            ConfigError::InvalidHost { host, .. } => {
                write!(f, "APP_HOST '{host}' is not an IP address or localhost")
            }
            ConfigError::EmptyPath { key } => write!(f, "{key} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::EmptyPath { .. } => None,
        }
    }
}

/// Serialises tests that touch process-wide environment variables.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
