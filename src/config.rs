use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::metrics::store::DEFAULT_CAPACITY;

/// Domain served when running with `APP_ENV=production` and no explicit URL.
pub const CANONICAL_BASE_URL: &str = "https://your-portfolio-domain.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Cap on buffered metric samples
    pub buffer_capacity: usize,
    /// Raw samples returned by a query without a usable `limit`
    pub default_query_limit: usize,
    /// Tick of the statistics SSE feed
    pub stream_interval_ms: u64,
    /// Absolute base for preview URLs; `None` derives it per request
    pub public_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            buffer_capacity: DEFAULT_CAPACITY,
            default_query_limit: 100,
            stream_interval_ms: 1000,
            public_base_url: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let buffer_capacity = parse_or(&lookup, "BUFFER_CAPACITY", defaults.buffer_capacity)?;
        if buffer_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "BUFFER_CAPACITY",
                value: "0".into(),
            });
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            buffer_capacity,
            default_query_limit: parse_or(
                &lookup,
                "DEFAULT_QUERY_LIMIT",
                defaults.default_query_limit,
            )?,
            stream_interval_ms: parse_or(
                &lookup,
                "STREAM_INTERVAL_MS",
                defaults.stream_interval_ms,
            )?,
            public_base_url: resolve_base_url(&lookup),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// `PUBLIC_BASE_URL`, then `https://$VERCEL_URL`, then the canonical domain
/// in production. Anything else is left to per-request detection.
fn resolve_base_url<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("PUBLIC_BASE_URL") {
        return Some(url.trim_end_matches('/').to_owned());
    }
    if let Some(host) = non_empty("VERCEL_URL") {
        return Some(format!("https://{}", host.trim_end_matches('/')));
    }
    match non_empty("APP_ENV").as_deref() {
        Some("production") => Some(CANONICAL_BASE_URL.to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.buffer_capacity, 1000);
        assert_eq!(cfg.default_query_limit, 100);
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert!(cfg.public_base_url.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("BUFFER_CAPACITY", "50"),
            ("STREAM_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.buffer_capacity, 50);
        assert_eq!(cfg.stream_interval_ms, 250);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config(&[("BUFFER_CAPACITY", "lots")]).unwrap_err();
        assert!(err.to_string().contains("BUFFER_CAPACITY"));
        assert!(config(&[("BUFFER_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn base_url_precedence() {
        let cfg = config(&[
            ("PUBLIC_BASE_URL", "https://me.dev/"),
            ("VERCEL_URL", "preview.vercel.app"),
        ])
        .unwrap();
        assert_eq!(cfg.public_base_url.as_deref(), Some("https://me.dev"));

        let cfg = config(&[("VERCEL_URL", "preview.vercel.app")]).unwrap();
        assert_eq!(
            cfg.public_base_url.as_deref(),
            Some("https://preview.vercel.app")
        );

        let cfg = config(&[("APP_ENV", "production")]).unwrap();
        assert_eq!(cfg.public_base_url.as_deref(), Some(CANONICAL_BASE_URL));
    }
}
