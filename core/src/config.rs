//! Client and development-proxy configuration.
//!
//! Values come from `Default` or from the environment:
//!
//! | Variable               | Default                     |
//! |------------------------|-----------------------------|
//! | `CLOUD_API_BASE_URL`   | `http://127.0.0.1:8088/api` |
//! | `CLOUD_API_TIMEOUT_MS` | `100000`                    |
//! | `CLOUD_BACKEND_ADDR`   | `127.0.0.1:8088`            |

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_ADDR: &str = "127.0.0.1:8088";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100_000);
pub const API_PREFIX: &str = "/api";
pub const DAV_PREFIX: &str = "/dav";

const BASE_URL_VAR: &str = "CLOUD_API_BASE_URL";
const TIMEOUT_VAR: &str = "CLOUD_API_TIMEOUT_MS";
const BACKEND_VAR: &str = "CLOUD_BACKEND_ADDR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute URL every endpoint path is appended to, normally ending in `/api`.
    pub base_url: String,
    /// Whole-request timeout shared by every call.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: format!("http://{DEFAULT_BACKEND_ADDR}{API_PREFIX}"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(value) = lookup(BASE_URL_VAR) {
            config.base_url = check_base_url(BASE_URL_VAR, value)?;
        }

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let ms: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: TIMEOUT_VAR,
                value: value.clone(),
            })?;
            config.timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn check_base_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ConfigError::InvalidUrl { name, value }),
    }
}

/// Local development proxy: requests under the listed prefixes go to the
/// backend unchanged, everything else is served locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// `host:port` of the backend.
    pub backend: String,
    pub prefixes: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            backend: DEFAULT_BACKEND_ADDR.to_string(),
            prefixes: vec![API_PREFIX.to_string(), DAV_PREFIX.to_string()],
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ProxyConfig::default();

        if let Some(value) = lookup(BACKEND_VAR) {
            config.backend = check_addr(BACKEND_VAR, value)?;
        }

        Ok(config)
    }

    /// Upstream URL for `path`, or `None` when no prefix claims it. Prefixes
    /// match whole segments only, so `/apis` is not under `/api`.
    pub fn upstream_for(&self, path: &str) -> Option<String> {
        let claimed = self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
        });

        if claimed {
            Some(format!("http://{}{path}", self.backend))
        } else {
            None
        }
    }
}

fn check_addr(name: &'static str, value: String) -> Result<String, ConfigError> {
    let valid = value
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidAddr { name, value })
    }
}
