//! Client configuration (environment driven).

use std::time::Duration;

use sellerdesk_variants::GatewayError;

pub const API_URL_ENV: &str = "SELLERDESK_API_URL";
pub const API_TOKEN_ENV: &str = "SELLERDESK_API_TOKEN";
pub const TIMEOUT_ENV: &str = "SELLERDESK_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash.
    pub base_url: String,
    pub token: Option<String>,
    /// Per-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GatewayError> {
        let base_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| GatewayError::Config(format!("{API_URL_ENV} is not set")))?;

        let mut config = Self::new(base_url.trim());
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_token(token.trim());
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GatewayError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
