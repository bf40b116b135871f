use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;

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

/// Top-level configuration, read once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub scanner: ScannerConfig,
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

        let secret_key = match env::var("APP_SECRET_KEY") {
            Ok(value) if !value.trim().is_empty() => value,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSecretKey)
            }
            _ => "dev-secret".to_string(),
        };

        let public_base_url = env::var("APP_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let upload_root =
            PathBuf::from(env::var("APP_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let scan_endpoint = match env::var("CLAMD_SOCKET") {
            Ok(raw) if !raw.trim().is_empty() => Some(ScanEndpoint::parse(raw.trim())?),
            _ => None,
        };
        let scan_timeout_secs = match env::var("CLAMD_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidScanTimeout)?,
            Err(_) => DEFAULT_SCAN_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            security: SecurityConfig {
                secret_key,
                public_base_url,
            },
            uploads: UploadConfig { root: upload_root },
            scanner: ScannerConfig {
                endpoint: scan_endpoint,
                timeout: Duration::from_secs(scan_timeout_secs),
            },
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Process-wide secrets and public addressing.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub public_base_url: String,
}

/// Where accepted uploads land on disk.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub root: PathBuf,
}

/// Virus-scan daemon connection settings. `endpoint: None` disables scanning
/// entirely (the adapter reports every file as skipped).
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub endpoint: Option<ScanEndpoint>,
    pub timeout: Duration,
}

/// Address of the clamd daemon: a Unix socket path or a `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEndpoint {
    Unix(PathBuf),
    Tcp(String),
}

impl ScanEndpoint {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.starts_with('/') {
            return Ok(Self::Unix(PathBuf::from(raw)));
        }
        if raw.contains(':') {
            return Ok(Self::Tcp(raw.to_string()));
        }
        Err(ConfigError::InvalidScanEndpoint {
            value: raw.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_SECRET_KEY is required in production")]
    MissingSecretKey,
    #[error("CLAMD_SOCKET must be an absolute path or host:port pair, got '{value}'")]
    InvalidScanEndpoint { value: String },
    #[error("CLAMD_TIMEOUT_SECS must be a valid integer")]
    InvalidScanTimeout,
}
