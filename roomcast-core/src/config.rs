use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Token TTL bounds, seconds
pub const TOKEN_TTL_MIN_SECONDS: u64 = 60;
pub const TOKEN_TTL_MAX_SECONDS: u64 = 86_400;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub livekit: LiveKitConfig,
    pub storage: StorageConfig,
    pub egress: EgressConfig,
    pub token: TokenConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
        }
    }
}

/// HTTP Basic credentials protecting the façade itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub api_user: String,
    pub api_password: String,
}

/// Connection settings for the media server's administrative API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7880".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

/// S3-compatible object storage the media server writes recordings to.
/// The façade never touches the bucket itself, it only forwards these
/// credentials inside egress start requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub force_path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: "recordings".to_string(),
            region: "us-east-1".to_string(),
            force_path_style: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EgressConfig {
    /// Encoded file extension for recordings
    pub file_type: String,
    /// Fixed zone used for generated file names and response timestamps
    pub utc_offset_hours: i32,
    /// Cap on simultaneously outstanding start calls in the fan-out paths
    pub max_concurrent_starts: usize,
    /// Layout passed to room-composite recordings
    pub room_layout: String,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            file_type: "mp4".to_string(),
            utc_offset_hours: -6,
            max_concurrent_starts: 16,
            room_layout: "grid".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub default_ttl_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 14_400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (ROOMCAST_LIVEKIT_URL, etc.)
        builder = builder.add_source(
            Environment::with_prefix("ROOMCAST")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.token.default_ttl_seconds;
        if !(TOKEN_TTL_MIN_SECONDS..=TOKEN_TTL_MAX_SECONDS).contains(&ttl) {
            return Err(ConfigError::Message(format!(
                "token.default_ttl_seconds must be within {TOKEN_TTL_MIN_SECONDS}..={TOKEN_TTL_MAX_SECONDS}, got {ttl}"
            )));
        }
        if self.egress.max_concurrent_starts == 0 {
            return Err(ConfigError::Message(
                "egress.max_concurrent_starts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Media-server admin API base URL, with ws(s):// coerced to http(s)://
    /// (the admin API is plain HTTP even when clients connect over WebSocket)
    #[must_use]
    pub fn livekit_http_url(&self) -> String {
        let url = self.livekit.url.trim_end_matches('/');
        if let Some(rest) = url.strip_prefix("wss://") {
            format!("https://{rest}")
        } else if let Some(rest) = url.strip_prefix("ws://") {
            format!("http://{rest}")
        } else {
            url.to_string()
        }
    }

    /// Storage endpoint without a trailing slash
    #[must_use]
    pub fn storage_endpoint(&self) -> &str {
        self.storage.endpoint.trim_end_matches('/')
    }

    /// Get HTTP bind address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.http_address(), "0.0.0.0:8080");
        assert_eq!(config.egress.file_type, "mp4");
        assert_eq!(config.egress.utc_offset_hours, -6);
        assert_eq!(config.token.default_ttl_seconds, 14_400);
        assert!(config.storage.force_path_style);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_bounds_rejected() {
        let mut config = Config::default();
        config.token.default_ttl_seconds = 30;
        assert!(config.validate().is_err());

        config.token.default_ttl_seconds = 90_000;
        assert!(config.validate().is_err());

        config.token.default_ttl_seconds = 86_400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_livekit_url_coercion() {
        let mut config = Config::default();
        config.livekit.url = "wss://media.example.com/".to_string();
        assert_eq!(config.livekit_http_url(), "https://media.example.com");

        config.livekit.url = "ws://localhost:7880".to_string();
        assert_eq!(config.livekit_http_url(), "http://localhost:7880");

        config.livekit.url = "https://media.example.com".to_string();
        assert_eq!(config.livekit_http_url(), "https://media.example.com");
    }

    #[test]
    fn test_storage_endpoint_strips_slash() {
        let mut config = Config::default();
        config.storage.endpoint = "http://minio:9000/".to_string();
        assert_eq!(config.storage_endpoint(), "http://minio:9000");
    }
}
