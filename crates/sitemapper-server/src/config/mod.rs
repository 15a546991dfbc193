//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit CLI value, then environment variable,
//! then default.

use crate::error::{ServerError, ServerResult};

pub const ENV_ADDR: &str = "SITEMAPPER_ADDR";
pub const ENV_SERVER_NAME: &str = "SITEMAPPER_SERVER_NAME";
pub const ENV_HTTPS: &str = "SITEMAPPER_HTTPS";
pub const ENV_GZIP: &str = "SITEMAPPER_GZIP";
pub const ENV_CACHE: &str = "SITEMAPPER_CACHE";

const DEFAULT_ADDR: &str = "127.0.0.1:3100";
const DEFAULT_SERVER_NAME: &str = "localhost";

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (host:port).
    pub addr: String,
    /// Host (and optional port) written into sitemap URLs.
    pub server_name: String,
    /// Use `https` URLs in the sitemap.
    pub https: bool,
    /// Gzip sitemap responses for clients that accept it.
    pub gzip: bool,
    /// Cache the first rendered sitemap.
    pub cache: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            https: true,
            gzip: false,
            cache: false,
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub addr: Option<String>,
    pub server_name: Option<String>,
    pub https: Option<bool>,
    pub gzip: Option<bool>,
    pub cache: Option<bool>,
}

impl ServerConfig {
    /// Resolve the configuration from overrides, environment and defaults.
    pub fn resolve(overrides: ConfigOverrides) -> ServerResult<Self> {
        let defaults = Self::default();

        let addr = overrides
            .addr
            .or_else(|| env_string(ENV_ADDR))
            .unwrap_or(defaults.addr);

        let server_name = overrides
            .server_name
            .or_else(|| env_string(ENV_SERVER_NAME))
            .unwrap_or(defaults.server_name)
            .trim_end_matches('/')
            .to_string();

        let https = match overrides.https {
            Some(v) => v,
            None => env_bool(ENV_HTTPS)?.unwrap_or(defaults.https),
        };
        let gzip = match overrides.gzip {
            Some(v) => v,
            None => env_bool(ENV_GZIP)?.unwrap_or(defaults.gzip),
        };
        let cache = match overrides.cache {
            Some(v) => v,
            None => env_bool(ENV_CACHE)?.unwrap_or(defaults.cache),
        };

        tracing::debug!(
            addr = %addr,
            server_name = %server_name,
            https,
            gzip,
            cache,
            "configuration resolved"
        );

        Ok(Self {
            addr,
            server_name,
            https,
            gzip,
            cache,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str) -> ServerResult<Option<bool>> {
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ServerError::Config(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}
