//! Error types for signing operations

/// Errors that can occur while preparing an authenticated request
///
/// Every variant is a configuration problem: none of them are produced by the
/// network and none of them are worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// API key or private key is missing or empty
    #[error("API key and private key are required for private endpoints")]
    MissingCredentials,

    /// Invalid API credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Second-factor code could not be produced
    #[error("One-time password error: {0}")]
    Otp(String),

    /// Request parameters could not be form-encoded
    #[error("Failed to encode request body: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),
}

/// Result type for signing operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::EnvVarNotSet("KRAKEN_API_KEY".to_string());
        assert!(err.to_string().contains("KRAKEN_API_KEY"));
    }

    #[test]
    fn test_missing_credentials_message() {
        assert!(AuthError::MissingCredentials.to_string().contains("private key"));
    }
}
