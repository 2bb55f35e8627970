//! Configuration types for the event store.
//!
//! All configuration is loaded from environment variables. The store needs
//! to know where the remote API lives, how long feedback messages stay
//! visible, and which failures are surfaced to the user.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::gateway::ApiOperation;

/// Default lifetime of a feedback message.
const DEFAULT_MESSAGE_TTL_MS: u64 = 3000;

/// Default refresh interval of the monitor binary.
const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var {0}")]
    Missing(String),

    /// An environment variable is set to a value that cannot be used.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Which action failures set the user-visible message.
///
/// Every failure is logged either way; this only controls whether a
/// well-formed error body is copied into the store's message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorSurfacing {
    /// Create, publish, update and delete failures are all surfaced.
    #[default]
    Uniform,
    /// Only create and update failures are surfaced. Publish and delete
    /// failures are logged only.
    Legacy,
}

impl ErrorSurfacing {
    /// Whether a failure of `operation` should set the message.
    ///
    /// Listing failures are never surfaced.
    pub const fn surfaces(self, operation: ApiOperation) -> bool {
        match operation {
            ApiOperation::List => false,
            ApiOperation::Create | ApiOperation::Update => true,
            ApiOperation::Publish | ApiOperation::Delete => matches!(self, Self::Uniform),
        }
    }
}

impl FromStr for ErrorSurfacing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "legacy" => Ok(Self::Legacy),
            other => Err(ConfigError::Invalid(format!(
                "unknown error surfacing mode: {other}"
            ))),
        }
    }
}

impl fmt::Display for ErrorSurfacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// Complete store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the remote event API (e.g. `https://api.example.com/api`).
    pub api_url: String,
    /// Bearer token sent with every request, if any.
    pub api_token: Option<String>,
    /// Per-request timeout applied by the HTTP client. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// How long a feedback message stays set before it is cleared.
    pub message_ttl: Duration,
    /// Which failures set the user-visible message.
    pub error_surfacing: ErrorSurfacing,
    /// How often the monitor binary reloads the event list.
    pub refresh_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: String::from("http://localhost:4000/api"),
            api_token: None,
            request_timeout: None,
            message_ttl: Duration::from_millis(DEFAULT_MESSAGE_TTL_MS),
            error_surfacing: ErrorSurfacing::default(),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `VIDEOBOX_API_URL` -- base URL of the remote event API
    ///
    /// Optional variables:
    /// - `VIDEOBOX_API_TOKEN` -- bearer token (default none)
    /// - `VIDEOBOX_REQUEST_TIMEOUT_MS` -- HTTP request timeout, `0` disables (default `0`)
    /// - `VIDEOBOX_MESSAGE_TTL_MS` -- feedback message lifetime (default `3000`)
    /// - `VIDEOBOX_ERROR_SURFACING` -- `uniform` or `legacy` (default `uniform`)
    /// - `VIDEOBOX_REFRESH_INTERVAL_MS` -- monitor reload interval (default `30000`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("VIDEOBOX_API_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing(String::from("VIDEOBOX_API_URL")))?;

        let api_token = lookup("VIDEOBOX_API_TOKEN").filter(|token| !token.is_empty());

        let request_timeout_ms = parse_millis(&lookup, "VIDEOBOX_REQUEST_TIMEOUT_MS", 0)?;
        let message_ttl_ms =
            parse_millis(&lookup, "VIDEOBOX_MESSAGE_TTL_MS", DEFAULT_MESSAGE_TTL_MS)?;
        let refresh_interval_ms = parse_millis(
            &lookup,
            "VIDEOBOX_REFRESH_INTERVAL_MS",
            DEFAULT_REFRESH_INTERVAL_MS,
        )?;
        if refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "VIDEOBOX_REFRESH_INTERVAL_MS must be greater than zero",
            )));
        }

        let error_surfacing = lookup("VIDEOBOX_ERROR_SURFACING")
            .map(|raw| raw.parse::<ErrorSurfacing>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_url,
            api_token,
            request_timeout: (request_timeout_ms > 0)
                .then(|| Duration::from_millis(request_timeout_ms)),
            message_ttl: Duration::from_millis(message_ttl_ms),
            error_surfacing,
            refresh_interval: Duration::from_millis(refresh_interval_ms),
        })
    }
}

/// Parse an optional millisecond value, falling back to `default`.
fn parse_millis<F>(lookup: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid {name}: {e}")))
    })
}
