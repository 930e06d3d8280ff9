//! Rate-governed dispatcher
//!
//! Every endpoint method builds an [`ApiCall`] and hands it to
//! [`Dispatcher::execute`]. Each attempt goes through the same steps:
//!
//! 1. decay the counter and check it against `ceiling - 1`
//! 2. charge the call's cost
//! 3. sign (private calls get a fresh nonce every attempt) and send
//! 4. on a transient failure sleep `interval * cost` and start over
//!
//! The loop ends when Kraken answers with a success status, when a
//! non-transient error occurs, or when the counter can no longer admit an
//! attempt, which yields [`RestError::RateLimitExceeded`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use krakgov_auth::{AuthError, Signer};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::{ClientConfig, RetryPolicy};
use crate::cost::CostTable;
use crate::error::{RestError, RestResult};
use crate::governor::{Admission, RateGovernor};
use crate::response::Payload;
use crate::transport::{HttpRequest, Transport, TransportError};

/// Public or private endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// `/{version}/public/{method}`, unsigned
    Public,
    /// `/{version}/private/{method}`, signed
    Private,
}

impl Access {
    fn segment(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// One API call: method, parameters and an optional cost override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    method: String,
    access: Access,
    params: Vec<(String, String)>,
    cost: Option<u32>,
    timeout: Option<Duration>,
}

impl ApiCall {
    fn new(method: impl Into<String>, access: Access) -> Self {
        Self {
            method: method.into(),
            access,
            params: Vec::new(),
            cost: None,
            timeout: None,
        }
    }

    /// Call a public method, e.g. `"Ticker"`
    pub fn public(method: impl Into<String>) -> Self {
        Self::new(method, Access::Public)
    }

    /// Call a private method, e.g. `"Balance"` or `"Staking/Assets"`
    pub fn private(method: impl Into<String>) -> Self {
        Self::new(method, Access::Private)
    }

    /// Append a parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter when present
    pub fn opt_param<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Append a boolean parameter only when it is `true`
    pub fn flag(self, key: impl Into<String>, enabled: bool) -> Self {
        if enabled {
            self.param(key, true)
        } else {
            self
        }
    }

    /// Charge `cost` instead of the table entry
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost.max(1));
        self
    }

    /// Override the transport timeout for this call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Public or private
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the call is signed
    pub fn is_private(&self) -> bool {
        self.access == Access::Private
    }

    /// Parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// URL path for an API version, e.g. `/0/private/Balance`
    pub fn path(&self, api_version: u32) -> String {
        format!("/{}/{}/{}", api_version, self.access.segment(), self.method)
    }
}

/// Owns the rate counter and sends every call through the retry loop
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    signer: Option<Signer>,
    governor: RateGovernor,
    costs: CostTable,
    retry: RetryPolicy,
    base_url: String,
    api_version: u32,
    session_refresh: Option<u64>,
    request_counter: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher over `transport`
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> RestResult<Self> {
        config.validate()?;

        let signer = config.credentials.clone().map(|credentials| {
            let signer = Signer::new(credentials);
            match config.second_factor.clone() {
                Some(factor) => signer.with_second_factor(factor),
                None => signer,
            }
        });

        Ok(Self {
            transport,
            signer,
            governor: RateGovernor::new(config.retry.ceiling),
            costs: config.costs.clone(),
            retry: config.retry,
            base_url: config.base_url.clone(),
            api_version: config.api_version,
            session_refresh: config.effective_session_refresh(),
            request_counter: AtomicU64::new(0),
        })
    }

    /// Send a call, retrying transient failures while the counter allows
    #[instrument(skip(self, call), fields(method = %call.method, private = call.is_private()))]
    pub async fn execute(&self, call: ApiCall) -> RestResult<Payload> {
        let signer = match call.access {
            Access::Public => None,
            Access::Private => {
                let signer = self
                    .signer
                    .as_ref()
                    .ok_or(RestError::Auth(AuthError::MissingCredentials))?;
                signer.check()?;
                Some(signer)
            }
        };

        let cost = call.cost.unwrap_or_else(|| self.costs.cost_of(&call.method));
        let path = call.path(self.api_version);
        let url = format!("{}{}", self.base_url, path);

        let mut attempt: u32 = 1;
        let mut last_failure: Option<TransportError> = None;

        loop {
            let before = match self.governor.admit(cost) {
                Admission::Admitted { before } => before,
                Admission::Saturated { consumed } => {
                    warn!(attempt, consumed, ceiling = self.governor.ceiling(), "Call rate limiter exceeded");
                    return Err(RestError::RateLimitExceeded {
                        counter: consumed,
                        ceiling: self.governor.ceiling(),
                        attempts: attempt,
                        last_failure,
                    });
                }
            };

            let count = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(every) = self.session_refresh {
                if count % every == 0 {
                    debug!(count, "Renewing transport session");
                    self.transport.renew()?;
                }
            }

            let request = self.build_request(&url, &path, &call, signer)?;
            debug!(attempt, cost, consumed = before + f64::from(cost), "Sending request");

            let failure = match self.transport.post(request).await {
                Ok(response) if response.is_success() => return Payload::from_body(response.body),
                Ok(response) => TransportError::Status(response.status),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e.into()),
            };

            let backoff = self.retry.backoff(cost);
            warn!(attempt, error = %failure, backoff_ms = backoff.as_millis() as u64, "Transient failure, retrying");

            last_failure = Some(failure);
            attempt += 1;
            tokio::time::sleep(backoff).await;
        }
    }

    /// Send a call and deserialize its JSON result
    pub async fn execute_json<T: DeserializeOwned>(&self, call: ApiCall) -> RestResult<T> {
        self.execute(call).await?.deserialize()
    }

    fn build_request(
        &self,
        url: &str,
        path: &str,
        call: &ApiCall,
        signer: Option<&Signer>,
    ) -> RestResult<HttpRequest> {
        let (body, headers) = match signer {
            Some(signer) => {
                let signed = signer.sign_request(path, &call.params)?;
                let headers = signed.headers();
                (signed.body, headers)
            }
            None => {
                let body = serde_urlencoded::to_string(&call.params)
                    .map_err(|e| RestError::InvalidParameter(e.to_string()))?;
                (body, Vec::new())
            }
        };

        Ok(HttpRequest {
            url: url.to_string(),
            body,
            headers,
            timeout: call.timeout,
        })
    }

    /// Whether private calls can be signed
    pub fn has_credentials(&self) -> bool {
        self.signer
            .as_ref()
            .is_some_and(|signer| signer.credentials().is_complete())
    }

    /// Requests sent so far, retries included
    pub fn request_count(&self) -> u64 {
        self.request_counter.load(Ordering::Relaxed)
    }

    /// Current counter value
    pub fn consumed(&self) -> f64 {
        self.governor.consumed()
    }

    /// Rate governor
    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    /// Cost table
    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// Retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Close the transport; later calls fail with [`TransportError::Closed`]
    pub fn close(&self) {
        self.transport.close();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("has_credentials", &self.has_credentials())
            .field("ceiling", &self.governor.ceiling())
            .field("request_count", &self.request_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(ApiCall::public("Time").path(0), "/0/public/Time");
        assert_eq!(
            ApiCall::private("Staking/Assets").path(0),
            "/0/private/Staking/Assets"
        );
    }

    #[test]
    fn test_params_keep_order() {
        let call = ApiCall::private("ClosedOrders")
            .param("trades", true)
            .opt_param("userref", None::<i32>)
            .opt_param("start", Some(1_600_000_000))
            .flag("consolidate", false)
            .flag("ofs", true);

        assert_eq!(
            call.params(),
            &[
                ("trades".to_string(), "true".to_string()),
                ("start".to_string(), "1600000000".to_string()),
                ("ofs".to_string(), "true".to_string()),
            ]
        );
        assert!(call.is_private());
    }

    #[test]
    fn test_cost_override_is_at_least_one() {
        let call = ApiCall::public("Ticker").with_cost(0);
        assert_eq!(call.cost, Some(1));
    }
}
