use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Signing secret for access tokens (required when method = "token")
    #[serde(default)]
    pub secret: Option<String>,
    /// Token lifetime in minutes
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u32,
}

fn default_token_ttl() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Accept every request as anonymous. Development only, never a default.
    None,
    /// Bearer access tokens issued at login.
    Token,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("darkroom.db")
}

/// Object store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    /// Storage backend type. The backend is always an explicit choice;
    /// there is no availability probe or silent fallback.
    #[serde(default)]
    pub backend: ObjectStoreBackend,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// HTTP backend configuration (required when backend = "http")
    #[serde(default)]
    pub http: Option<HttpObjectStoreConfig>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            backend: ObjectStoreBackend::Memory,
            bucket: default_bucket(),
            http: None,
        }
    }
}

fn default_bucket() -> String {
    "images".to_string()
}

/// Available object store backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStoreBackend {
    /// In-process store, contents lost on restart. Tests and development.
    #[default]
    Memory,
    /// Network-backed blob store reached over HTTP.
    Http,
}

/// HTTP object store backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpObjectStoreConfig {
    /// Base URL of the blob store (e.g. "http://localhost:9000")
    pub url: String,
    /// Access key sent with every request
    pub access_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub object_store: SanitizedObjectStoreConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub secret_configured: bool,
    pub token_ttl_minutes: u32,
}

/// Sanitized object store config (access key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedObjectStoreConfig {
    pub backend: String,
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<SanitizedHttpObjectStoreConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHttpObjectStoreConfig {
    pub url: String,
    pub access_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::Token => "token".to_string(),
                },
                secret_configured: config
                    .auth
                    .secret
                    .as_ref()
                    .is_some_and(|s| !s.is_empty()),
                token_ttl_minutes: config.auth.token_ttl_minutes,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            object_store: SanitizedObjectStoreConfig {
                backend: match config.object_store.backend {
                    ObjectStoreBackend::Memory => "memory".to_string(),
                    ObjectStoreBackend::Http => "http".to_string(),
                },
                bucket: config.object_store.bucket.clone(),
                http: config.object_store.http.as_ref().map(|h| {
                    SanitizedHttpObjectStoreConfig {
                        url: h.url.clone(),
                        access_key_configured: !h.access_key.is_empty(),
                        timeout_secs: h.timeout_secs,
                    }
                }),
            },
        }
    }
}
