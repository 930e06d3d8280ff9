//! Client configuration

use std::time::Duration;

use krakgov_auth::{Credentials, SecondFactor};

use crate::cost::CostTable;
use crate::error::{RestError, RestResult};
use crate::transport::{TransportSettings, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Kraken REST base URL
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// API version segment of every path
pub const DEFAULT_API_VERSION: u32 = 0;

/// Default pause between retries of a cost-1 call
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Default counter ceiling (Kraken's starter tier)
pub const DEFAULT_CEILING: u32 = 20;

/// Requests between session renewals when tunneled
pub const DEFAULT_SESSION_REFRESH: u64 = 5;

/// Retry pacing and the counter ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep per unit of cost after a transient failure
    pub interval: Duration,
    /// Counter ceiling; attempts are admitted while the counter is below `ceiling - 1`
    pub ceiling: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            ceiling: DEFAULT_CEILING,
        }
    }
}

impl RetryPolicy {
    /// Sleep after a transient failure of a call costing `cost`
    pub fn backoff(&self, cost: u32) -> Duration {
        self.interval * cost
    }
}

/// Client configuration
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use krakgov::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_ceiling(15)
///     .with_retry_interval(Duration::from_secs(1))
///     .with_cost("AddOrder", 0);
/// assert_eq!(config.retry.ceiling, 15);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (optional)
    pub credentials: Option<Credentials>,
    /// Second factor for private calls
    pub second_factor: Option<SecondFactor>,
    /// Base URL without trailing slash
    pub base_url: String,
    /// API version path segment
    pub api_version: u32,
    /// Request timeout
    pub timeout: Duration,
    /// User agent
    pub user_agent: String,
    /// Retry interval and ceiling
    pub retry: RetryPolicy,
    /// Proxy URL; requests are tunneled when set
    pub proxy: Option<String>,
    /// Renew the transport session every `n` requests
    pub session_refresh: Option<u64>,
    /// Call costs
    pub costs: CostTable,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            second_factor: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            proxy: None,
            session_refresh: None,
            costs: CostTable::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with credentials from `KRAKEN_API_KEY` / `KRAKEN_PRIVATE_KEY`
    pub fn from_env() -> RestResult<Self> {
        Ok(Self::new().with_credentials(Credentials::from_env()?))
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the second factor sent as `otp`
    pub fn with_second_factor(mut self, second_factor: SecondFactor) -> Self {
        self.second_factor = Some(second_factor);
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API version
    pub fn with_api_version(mut self, version: u32) -> Self {
        self.api_version = version;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the pause per unit of cost after a transient failure
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry.interval = interval;
        self
    }

    /// Set the counter ceiling
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.retry.ceiling = ceiling;
        self
    }

    /// Route requests through a proxy, e.g. Tor at `socks5h://127.0.0.1:9050`
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Renew the transport session every `requests` requests
    pub fn with_session_refresh(mut self, requests: u64) -> Self {
        self.session_refresh = Some(requests);
        self
    }

    /// Override the cost of one method
    pub fn with_cost(mut self, method: impl Into<String>, cost: u32) -> Self {
        self.costs.set(method, cost);
        self
    }

    /// Replace the whole cost table
    pub fn with_costs(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    /// Session refresh in effect: the explicit value, or every
    /// [`DEFAULT_SESSION_REFRESH`] requests when tunneled
    pub fn effective_session_refresh(&self) -> Option<u64> {
        self.session_refresh
            .or_else(|| self.proxy.as_ref().map(|_| DEFAULT_SESSION_REFRESH))
    }

    /// Settings for the HTTP transport
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
        }
    }

    /// Reject settings the dispatcher cannot work with
    pub fn validate(&self) -> RestResult<()> {
        if self.retry.ceiling < 2 {
            return Err(RestError::Configuration(format!(
                "ceiling must be at least 2, got {}",
                self.retry.ceiling
            )));
        }
        if self.base_url.is_empty() {
            return Err(RestError::Configuration("base URL is empty".to_string()));
        }
        if self.session_refresh == Some(0) {
            return Err(RestError::Configuration(
                "session refresh must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
