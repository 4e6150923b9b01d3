//! Configuration loader.
//!
//! Loads application configuration from environment variables or a TOML
//! file; environment wins. The secret-store key comes exclusively from the
//! environment and is validated once at startup — a missing or malformed key
//! is a hard error, not a warning.
//!
//! ## Environment Variables
//! - `DAYLINE_SECRET_KEY`: 64 hex chars, the 32-byte secret-store key (required)
//! - `DAYLINE_DB_PATH`: database file path
//! - `DAYLINE_DB_POOL_SIZE`: connection pool size
//! - `DAYLINE_BIND_ADDR`: HTTP bind address
//! - `DAYLINE_SOURCES_PATH`: source catalog file path
//! - `DAYLINE_OAUTH_CLIENT_ID`: OAuth client id
//! - `DAYLINE_OAUTH_CLIENT_SECRET`: OAuth client secret (optional)
//! - `DAYLINE_OAUTH_REDIRECT_URI`: OAuth redirect URI

use std::path::{Path, PathBuf};

use dayline_domain::{constants, DaylineError, Result};
use serde::Deserialize;

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    10
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7400".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

/// OAuth client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub oauth: Option<OAuthClientConfig>,
    pub sources_path: PathBuf,
    /// Raw 32-byte secret-store key, decoded from `DAYLINE_SECRET_KEY`.
    pub secret_key: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    database: DatabaseConfig,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    oauth: Option<OAuthClientConfig>,
    #[serde(default = "default_sources_path")]
    sources_path: PathBuf,
}

fn default_sources_path() -> PathBuf {
    PathBuf::from("sources.toml")
}

/// Load configuration with automatic fallback strategy.
///
/// Attempts environment variables first; falls back to probing for a config
/// file. The secret key always comes from the environment.
pub fn load() -> Result<AppConfig> {
    let secret_key = load_secret_key()?;

    match load_from_env() {
        Ok(partial) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(partial.into_config(secret_key))
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment configuration incomplete, trying file");
            let partial = load_from_file(None)?;
            Ok(partial.into_config(secret_key))
        }
    }
}

impl FileConfig {
    fn into_config(self, secret_key: Vec<u8>) -> AppConfig {
        AppConfig {
            database: self.database,
            server: self.server,
            oauth: self.oauth,
            sources_path: self.sources_path,
            secret_key,
        }
    }
}

/// Read and validate `DAYLINE_SECRET_KEY`.
///
/// # Errors
/// Returns `DaylineError::CryptoKey` when the variable is missing or does
/// not decode to exactly 32 bytes.
pub fn load_secret_key() -> Result<Vec<u8>> {
    let raw = std::env::var("DAYLINE_SECRET_KEY").map_err(|_| {
        DaylineError::CryptoKey("DAYLINE_SECRET_KEY is not set".to_string())
    })?;

    decode_secret_key(&raw)
}

/// Decode and validate a hex-encoded secret key.
pub fn decode_secret_key(raw: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(raw.trim()).map_err(|e| {
        DaylineError::CryptoKey(format!("DAYLINE_SECRET_KEY is not valid hex: {e}"))
    })?;

    if bytes.len() != constants::SECRET_KEY_LEN {
        return Err(DaylineError::CryptoKey(format!(
            "DAYLINE_SECRET_KEY must decode to {} bytes, got {}",
            constants::SECRET_KEY_LEN,
            bytes.len()
        )));
    }

    Ok(bytes)
}

fn load_from_env() -> Result<FileConfig> {
    let db_path = env_var("DAYLINE_DB_PATH")?;
    let pool_size = match std::env::var("DAYLINE_DB_POOL_SIZE") {
        Ok(value) => value
            .parse::<u32>()
            .map_err(|e| DaylineError::Config(format!("invalid pool size: {e}")))?,
        Err(_) => default_pool_size(),
    };

    let oauth = match std::env::var("DAYLINE_OAUTH_CLIENT_ID") {
        Ok(client_id) => Some(OAuthClientConfig {
            client_id,
            client_secret: std::env::var("DAYLINE_OAUTH_CLIENT_SECRET").ok(),
            redirect_uri: env_var("DAYLINE_OAUTH_REDIRECT_URI")?,
        }),
        Err(_) => None,
    };

    Ok(FileConfig {
        database: DatabaseConfig { path: PathBuf::from(db_path), pool_size },
        server: ServerConfig {
            bind_addr: std::env::var("DAYLINE_BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
        },
        oauth,
        sources_path: std::env::var("DAYLINE_SOURCES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_sources_path()),
    })
}

/// Load configuration from a TOML file.
///
/// If `path` is `None`, probes standard locations.
fn load_from_file(path: Option<PathBuf>) -> Result<FileConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DaylineError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DaylineError::Config("no config file found in any standard location".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DaylineError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents)
        .map_err(|e| DaylineError::Config(format!("invalid TOML configuration: {e}")))
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: &[&str] =
        &["config.toml", "dayline.toml", "../config.toml", "../dayline.toml"];

    CANDIDATES.iter().map(Path::new).find(|p| p.exists()).map(Path::to_path_buf)
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| DaylineError::Config(format!("missing environment variable: {name}")))
}
