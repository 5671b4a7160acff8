//! Process settings from environment variables.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/taskflow";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Replacement catalog file; the built-in catalog is used when unset.
    pub resources_path: Option<PathBuf>,
    /// Create missing tables at startup.
    pub bootstrap: bool,
    /// No timeout unless configured.
    pub request_timeout: Option<Duration>,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: 5,
            resources_path: None,
            bootstrap: true,
            request_timeout: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let d = Settings::default();

        Ok(Settings {
            host: get("HOST").unwrap_or(d.host),
            port: parse_or(&get, "PORT", d.port)?,
            database_url: get("DATABASE_URL").unwrap_or(d.database_url),
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", d.max_connections)?,
            resources_path: get("TASKFLOW_RESOURCES").map(PathBuf::from),
            bootstrap: parse_or(&get, "TASKFLOW_BOOTSTRAP", d.bootstrap)?,
            request_timeout: match get("REQUEST_TIMEOUT_SECS") {
                Some(v) => Some(Duration::from_secs(parse("REQUEST_TIMEOUT_SECS", &v)?)),
                None => None,
            },
            body_limit: parse_or(&get, "BODY_LIMIT_BYTES", d.body_limit)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Settings {
        name,
        message: format!("'{}': {}", raw, e),
    })
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(v) => parse(name, &v),
        None => Ok(default),
    }
}
