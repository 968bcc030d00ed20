//! API credentials and client settings.
//!
//! Read once at process start. Missing key or secret is fatal there and
//! never surfaces as a per-call failure.

use std::fmt;
use std::time::Duration;

use crate::error::CredentialsError;

/// Service origin used when `POLYGON_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://polygon.codeforces.com/api";

/// Per-call timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

pub const ENV_API_KEY: &str = "POLYGON_API_KEY";
pub const ENV_API_SECRET: &str = "POLYGON_API_SECRET";
pub const ENV_BASE_URL: &str = "POLYGON_BASE_URL";
const ENV_API_KEY_SHORT: &str = "POLYGON_KEY";
const ENV_API_SECRET_SHORT: &str = "POLYGON_SECRET";

/// Key/secret pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Everything the HTTP client needs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// `POLYGON_KEY` / `POLYGON_SECRET` are accepted as fallbacks for the
    /// long names. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_SHORT));
        let api_secret = get(ENV_API_SECRET).or_else(|| get(ENV_API_SECRET_SHORT));
        let base_url = get(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        match (api_key, api_secret) {
            (Some(key), Some(secret)) => Ok(Self::new(Credentials::new(key, secret), base_url)),
            (key, secret) => {
                let mut missing = Vec::new();
                if key.is_none() {
                    missing.push(ENV_API_KEY);
                }
                if secret.is_none() {
                    missing.push(ENV_API_SECRET);
                }
                Err(CredentialsError { missing })
            }
        }
    }
}
