//! Client configuration for the registry API.

use std::fmt;
use std::time::Duration;

/// Companies House public data API.
pub const DEFAULT_BASE_URL: &str = "https://api.company-information.service.gov.uk";

/// Upper bound on a single registry request, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the registry client needs, built once by the caller.
///
/// The API key is sent as the basic-auth username (empty password) on every
/// request. It never appears in `Debug` output.
#[derive(Clone)]
pub struct RegistryConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl RegistryConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another registry host.
    ///
    /// `base_url` should be like `http://localhost:4000`; a trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
