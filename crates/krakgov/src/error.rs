//! Error types for REST API operations

use krakgov_auth::AuthError;

use crate::error_codes::{ErrorCategory, ExchangeError};
use crate::transport::TransportError;

/// Errors that can occur during REST API operations
///
/// The four kinds callers usually branch on:
/// - configuration ([`Auth`](Self::Auth), [`Configuration`](Self::Configuration)):
///   raised before any network I/O, never retried
/// - [`RateLimitExceeded`](Self::RateLimitExceeded): the client-side cost
///   counter could not admit another attempt
/// - [`Api`](Self::Api): Kraken rejected the call in a successful HTTP
///   response; never retried
/// - [`Transport`](Self::Transport): a transport failure that is not worth
///   retrying (e.g. the client was closed)
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Missing or malformed credentials, or a failing second factor
    #[error("Configuration error: {0}")]
    Auth(#[from] AuthError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-retryable transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Client-side call-rate counter saturated
    #[error("Call rate limiter exceeded: counter={counter:.2} limit={ceiling} after {attempts} attempt(s)")]
    RateLimitExceeded {
        /// Counter value when admission was refused
        counter: f64,
        /// Configured ceiling
        ceiling: u32,
        /// Attempts made, including the refused one
        attempts: u32,
        /// Transient failure that preceded the refusal, if any
        #[source]
        last_failure: Option<TransportError>,
    },

    /// API returned an error
    #[error("API error: {message}")]
    Api {
        /// Parsed errors, in the order Kraken sent them
        errors: Vec<ExchangeError>,
        /// Error strings joined with ", "
        message: String,
    },

    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Writing a downloaded report failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RestError {
    /// Create an API error from error strings returned by Kraken
    pub fn from_api_errors(errors: Vec<String>) -> Self {
        let message = errors.join(", ");
        let errors = errors.iter().map(|e| ExchangeError::parse(e)).collect();

        Self::Api { errors, message }
    }

    /// Raised before any network I/O because of credentials or settings
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Configuration(_))
    }

    /// Client-side saturation, or Kraken reporting its own rate limit
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } => true,
            Self::Api { errors, .. } => errors.iter().any(ExchangeError::is_rate_limit),
            _ => false,
        }
    }

    /// Kraken rejected the request (business error)
    pub fn is_exchange_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Category of the first exchange error, if this is one
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Api { errors, .. } => errors.first().map(|e| e.category),
            _ => None,
        }
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_error() {
        let err = RestError::from_api_errors(vec!["EAPI:Rate limit exceeded".to_string()]);
        assert!(err.is_rate_limited());
        assert!(err.is_exchange_error());
        assert_eq!(err.category(), Some(ErrorCategory::Api));
    }

    #[test]
    fn test_api_error_message_keeps_all_errors() {
        let err = RestError::from_api_errors(vec![
            "EOrder:Invalid price".to_string(),
            "EGeneral:Invalid arguments".to_string(),
        ]);
        assert_eq!(err.to_string(), "API error: EOrder:Invalid price, EGeneral:Invalid arguments");
        assert_eq!(err.category(), Some(ErrorCategory::Order));
    }

    #[test]
    fn test_configuration_kinds() {
        assert!(RestError::Auth(AuthError::MissingCredentials).is_configuration());
        assert!(RestError::Configuration("ceiling must be at least 2".into()).is_configuration());
        assert!(!RestError::Parse("x".into()).is_configuration());
    }

    #[test]
    fn test_rate_limit_display() {
        let err = RestError::RateLimitExceeded {
            counter: 19.5,
            ceiling: 20,
            attempts: 3,
            last_failure: Some(TransportError::Status(503)),
        };
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("counter=19.50 limit=20"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
