use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which adapters back the version engine.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Process-local maps. Data is lost on restart.
    Memory,
    /// PostgreSQL for metadata records, S3 / MinIO for prompt content.
    Aws {
        database_url: String,
        s3: S3Config,
    },
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    /// Optional Redis cache in front of the blob store.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub cas_max_attempts: u32,
    pub cas_base_delay: Duration,
    pub max_prompt_bytes: usize,
    pub cache_ttl_secs: u64,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend = match optional_env("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .as_str()
        {
            "memory" => BackendConfig::Memory,
            "postgres" => BackendConfig::Aws {
                database_url: require_env("DATABASE_URL")?,
                s3: S3Config {
                    bucket: require_env("S3_BUCKET")?,
                    endpoint: require_env("S3_ENDPOINT")?,
                    region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                    access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                    secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
                },
            },
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let cas_max_attempts: u32 = parse_env("CAS_MAX_ATTEMPTS", 3)?;
        if cas_max_attempts == 0 {
            bail!("CAS_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            backend,
            redis_url: optional_env("REDIS_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cas_max_attempts,
            cas_base_delay: Duration::from_millis(parse_env("CAS_BASE_DELAY_MS", 20)?),
            max_prompt_bytes: parse_env("MAX_PROMPT_BYTES", 1024 * 1024)?,
            cache_ttl_secs: parse_env("CACHE_TTL_SECS", 600)?,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
