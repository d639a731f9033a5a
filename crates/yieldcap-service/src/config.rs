//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/yieldcap").
    pub data_dir: String,

    /// HS256 secret for signing bearer tokens.
    pub jwt_secret: String,

    /// Bearer token lifetime in hours (default: 120).
    pub jwt_ttl_hours: i64,

    /// Operator secret for admin endpoints; unset rejects every admin request.
    pub admin_key: Option<String>,

    /// Root account created on an empty ledger.
    pub bootstrap: Option<BootstrapConfig>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Credentials of the root account.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Login email.
    pub email: String,
    /// Plain password, hashed at bootstrap.
    pub password: String,
    /// Display name (default: "Root").
    pub name: String,
}

/// Configuration errors that prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No signing secret in the environment or secrets file.
    #[error("JWT_SECRET is not set")]
    MissingJwtSecret,

    /// Token lifetime is not a positive number of hours.
    #[error("JWT_TTL_HOURS must be a positive number of hours, got {0:?}")]
    InvalidJwtTtl(String),
}

/// Default bearer token lifetime.
const DEFAULT_JWT_TTL_HOURS: i64 = 120;

/// Longest accepted bearer token lifetime (ten years).
const MAX_JWT_TTL_HOURS: i64 = 24 * 365 * 10;

/// Auth secrets file structure.
#[derive(Debug, Deserialize)]
struct AuthSecrets {
    jwt_secret: String,
    #[serde(default)]
    admin_key: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingJwtSecret` when no signing secret is configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let (jwt_secret, admin_key) = load_auth_secrets();
        let jwt_secret = non_empty(jwt_secret).ok_or(ConfigError::MissingJwtSecret)?;
        let admin_key = non_empty(admin_key);
        let jwt_ttl_hours = parse_jwt_ttl_hours(std::env::var("JWT_TTL_HOURS").ok())?;

        let bootstrap = std::env::var("BOOTSTRAP_EMAIL")
            .ok()
            .zip(std::env::var("BOOTSTRAP_PASSWORD").ok())
            .map(|(email, password)| BootstrapConfig {
                email,
                password,
                name: std::env::var("BOOTSTRAP_NAME").unwrap_or_else(|_| "Root".into()),
            });

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/yieldcap".into()),
            jwt_secret,
            jwt_ttl_hours,
            admin_key,
            bootstrap,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }
}

/// Load the JWT secret and admin key from file or environment.
fn load_auth_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/auth.json",
        "yieldcap/.secrets/auth.json",
        "../.secrets/auth.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<AuthSecrets>(path) {
            tracing::info!(path = %path, "Loaded auth secrets from file");
            return (
                Some(secrets.jwt_secret),
                non_empty(secrets.admin_key).or_else(|| std::env::var("ADMIN_KEY").ok()),
            );
        }
    }

    tracing::debug!("Auth secrets file not found, using environment variables");
    (
        std::env::var("JWT_SECRET").ok(),
        std::env::var("ADMIN_KEY").ok(),
    )
}

/// Treat a blank secret the same as a missing one.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse `JWT_TTL_HOURS`, defaulting when unset.
fn parse_jwt_ttl_hours(raw: Option<String>) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_JWT_TTL_HOURS);
    };

    match raw.trim().parse::<i64>() {
        Ok(hours) if (1..=MAX_JWT_TTL_HOURS).contains(&hours) => Ok(hours),
        _ => Err(ConfigError::InvalidJwtTtl(raw)),
    }
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/yieldcap".into(),
            jwt_secret: String::new(),
            jwt_ttl_hours: DEFAULT_JWT_TTL_HOURS,
            admin_key: None,
            bootstrap: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
