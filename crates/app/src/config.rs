use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use remark_infra::notify::DEFAULT_SUBSCRIBER_BUFFER;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub subscriber_buffer: usize,
    pub max_page_limit: usize,
    pub sse_keepalive: Duration,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Postgres,
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(StorageKind::Memory),
            "postgres" => Ok(StorageKind::Postgres),
            _ => Err(ConfigError::InvalidValue(
                "REMARK_STORAGE",
                value.to_string(),
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("{0} is required when REMARK_STORAGE=postgres")]
    Missing(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("REMARK_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let storage: StorageKind = read_string("REMARK_STORAGE", "memory").parse()?;
        let database_url = read_optional_string("REMARK_DATABASE_URL");
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("REMARK_DATABASE_URL"));
        }
        let db_max_connections = read_number("REMARK_DB_MAX_CONNECTIONS", 5u32)?;
        let subscriber_buffer =
            read_positive("REMARK_SUBSCRIBER_BUFFER", DEFAULT_SUBSCRIBER_BUFFER)?;
        let max_page_limit = read_positive("REMARK_MAX_PAGE_LIMIT", 100)?;
        let sse_keepalive_secs = read_number("REMARK_SSE_KEEPALIVE_SECS", 15u64)?;
        let cors_allow_origins =
            parse_origins(&read_string("REMARK_CORS_ALLOW_ORIGINS", ""));

        Ok(Self {
            http_addr,
            storage,
            database_url,
            db_max_connections,
            subscriber_buffer,
            max_page_limit,
            sse_keepalive: Duration::from_secs(sse_keepalive_secs),
            cors_allow_origins,
        })
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_number<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + ToString,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_positive(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let value = read_number(key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(key, value.to_string()));
    }
    Ok(value)
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(parse_dotenv_line)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_dotenv_value(value.trim());
    Some((key.to_string(), value))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        return stripped.replace("\\n", "\n").replace("\\\"", "\"");
    }
    if let Some(stripped) = value.strip_prefix('\'').and_then(|inner| inner.strip_suffix('\'')) {
        return stripped.to_string();
    }
    value.to_string()
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        http_addr: "127.0.0.1:0".parse().unwrap(),
        storage: StorageKind::Memory,
        database_url: None,
        db_max_connections: 1,
        subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        max_page_limit: 100,
        sse_keepalive: Duration::from_secs(15),
        cors_allow_origins: Vec::new(),
    }
}
