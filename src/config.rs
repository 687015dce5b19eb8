//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Only `LISTEN_ADDR` is strict; every
//! other key falls back to its default when missing or unparseable.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::RelayError;

/// Browser origins allowed to open a signaling connection.
///
/// Peers that send no `Origin` header (native clients, tests) are always
/// accepted; the policy only constrains browsers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Accepts every origin.
    #[must_use]
    pub const fn any() -> Self {
        Self(Vec::new())
    }

    /// Accepts exactly the given origins.
    #[must_use]
    pub fn list<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(origins.into_iter().map(Into::into).collect())
    }

    /// Parses a comma-separated list. Empty input or a `*` entry means any.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if origins.iter().any(|o| o == "*") {
            return Self::any();
        }
        Self(origins)
    }

    /// Returns `true` if every origin is accepted.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the explicit origins (empty when any origin is accepted).
    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.0
    }

    /// Decides whether a request with the given `Origin` header may connect.
    #[must_use]
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.is_any() => true,
            Some(origin) => self.0.iter().any(|allowed| allowed == origin),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level hub configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the server to (e.g. `0.0.0.0:8888`).
    pub listen_addr: SocketAddr,

    /// Browser origins allowed to connect.
    pub allowed_origins: AllowedOrigins,

    /// Bound of each peer's outbound queue.
    pub peer_queue_capacity: usize,

    /// Period between server pings.
    pub heartbeat_interval: Duration,

    /// Silence after which a peer is considered gone.
    pub client_timeout: Duration,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8888)),
            allowed_origins: AllowedOrigins::parse(DEFAULT_ALLOWED_ORIGINS),
            peer_queue_capacity: 256,
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(10),
            log_format: LogFormat::Pretty,
        }
    }
}

const DEFAULT_ALLOWED_ORIGINS: &str = "https://localhost:3001,http://localhost:3000";

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| RelayError::InvalidConfig(format!("LISTEN_ADDR {raw:?}: {e}")))?,
            Err(_) => defaults.listen_addr,
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|raw| AllowedOrigins::parse(&raw))
            .unwrap_or(defaults.allowed_origins);

        let peer_queue_capacity = parse_env("PEER_QUEUE_CAPACITY", defaults.peer_queue_capacity);
        let heartbeat_interval = Duration::from_secs(parse_env(
            "HEARTBEAT_INTERVAL_SECS",
            defaults.heartbeat_interval.as_secs(),
        ));
        let client_timeout = Duration::from_secs(parse_env(
            "CLIENT_TIMEOUT_SECS",
            defaults.client_timeout.as_secs(),
        ));

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            allowed_origins,
            peer_queue_capacity,
            heartbeat_interval,
            client_timeout,
            log_format,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
