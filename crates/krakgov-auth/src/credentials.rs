//! API credentials for Kraken's private endpoints
//!
//! # Security
//!
//! The private key is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AuthError, AuthResult};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "KRAKEN_API_KEY";
/// Environment variable holding the base64 private key
pub const PRIVATE_KEY_ENV: &str = "KRAKEN_PRIVATE_KEY";

/// API key and base64 private key
///
/// Construction never fails: an empty key or secret simply leaves the
/// credentials incomplete, and a malformed secret is reported when a request
/// is signed. Both cases surface as [`AuthError`] before anything touches the
/// network.
pub struct Credentials {
    /// API key (public)
    api_key: String,
    /// Private key as handed out by Kraken (base64, zeroized on drop)
    private_key: SecretString,
}

impl Credentials {
    /// Create credentials from an API key and a base64 private key
    pub fn new(api_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            private_key: SecretString::from(private_key.into()),
        }
    }

    /// Create credentials from environment variables
    ///
    /// Reads `KRAKEN_API_KEY` and `KRAKEN_PRIVATE_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let private_key = std::env::var(PRIVATE_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(PRIVATE_KEY_ENV.to_string()))?;

        Ok(Self::new(api_key, private_key))
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether both the API key and the private key are present
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.private_key.expose_secret().is_empty()
    }

    /// Base64 private key, for callers that sign through [`crate::sign`]
    pub fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }

    /// Check completeness and decode the private key into HMAC key bytes
    pub fn decode_private_key(&self) -> AuthResult<Vec<u8>> {
        if !self.is_complete() {
            return Err(AuthError::MissingCredentials);
        }
        decode_secret(self.private_key.expose_secret())
    }
}

/// Decode a base64 private key
pub(crate) fn decode_secret(secret: &str) -> AuthResult<Vec<u8>> {
    BASE64
        .decode(secret)
        .map_err(|e| AuthError::InvalidCredentials(format!("Invalid base64 private key: {}", e)))
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self::new(self.api_key.clone(), self.private_key.expose_secret().to_owned())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", shown))
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = Credentials::new("test_api_key", "dGVzdF9wcml2YXRlX2tleQ==");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("dGVzdF9wcml2YXRlX2tleQ=="));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_secret_is_incomplete() {
        let creds = Credentials::new("key", "");
        assert!(!creds.is_complete());
        assert!(matches!(
            creds.decode_private_key(),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_empty_key_is_incomplete() {
        let creds = Credentials::new("", "dGVzdF9wcml2YXRlX2tleQ==");
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let creds = Credentials::new("key", "not base64!!");
        assert!(matches!(
            creds.decode_private_key(),
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_decode_private_key() {
        let creds = Credentials::new("key", "dGVzdF9wcml2YXRlX2tleQ==");
        assert_eq!(creds.decode_private_key().unwrap(), b"test_private_key");
    }

    #[test]
    fn test_clone_keeps_secret() {
        let creds = Credentials::new("key", "dGVzdF9wcml2YXRlX2tleQ==");
        let cloned = creds.clone();
        assert_eq!(cloned.private_key(), creds.private_key());
        assert_eq!(cloned.api_key(), "key");
    }
}
