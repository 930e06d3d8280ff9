//! Second-factor codes for API keys protected by a one-time password
//!
//! Kraken lets an API key require an `otp` form field on every private call.
//! The value is either a fixed password chosen when the key was created or a
//! code from an authenticator app.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::error::AuthResult;

/// Source of one-time passwords supplied by the caller
pub trait OtpGenerator: Send + Sync {
    /// Produce the code to send with the next request
    fn generate(&self) -> AuthResult<String>;
}

impl<F> OtpGenerator for F
where
    F: Fn() -> AuthResult<String> + Send + Sync,
{
    fn generate(&self) -> AuthResult<String> {
        self()
    }
}

/// Second factor configured on the API key
pub enum SecondFactor {
    /// Static password sent verbatim
    StaticPassword(SecretString),
    /// Authenticator-app setup key (base32); a TOTP code is generated per call
    #[cfg(feature = "totp")]
    AuthenticatorApp(SecretString),
    /// Any other generator
    External(Arc<dyn OtpGenerator>),
}

impl SecondFactor {
    /// Static password method
    pub fn static_password(password: impl Into<String>) -> Self {
        Self::StaticPassword(SecretString::from(password.into()))
    }

    /// Authenticator-app method from the base32 setup key
    #[cfg(feature = "totp")]
    pub fn authenticator_app(setup_key: impl Into<String>) -> Self {
        Self::AuthenticatorApp(SecretString::from(setup_key.into()))
    }

    /// Delegate code generation to `generator`
    pub fn external(generator: impl OtpGenerator + 'static) -> Self {
        Self::External(Arc::new(generator))
    }

    /// Short method name, safe to log
    pub fn method(&self) -> &'static str {
        match self {
            Self::StaticPassword(_) => "static password",
            #[cfg(feature = "totp")]
            Self::AuthenticatorApp(_) => "2FA app",
            Self::External(_) => "external",
        }
    }

    /// Code for the `otp` field of the next request
    pub fn code(&self) -> AuthResult<String> {
        match self {
            Self::StaticPassword(password) => Ok(password.expose_secret().to_owned()),
            #[cfg(feature = "totp")]
            Self::AuthenticatorApp(setup_key) => totp_code(setup_key.expose_secret()),
            Self::External(generator) => generator.generate(),
        }
    }
}

#[cfg(feature = "totp")]
fn totp_code(setup_key: &str) -> AuthResult<String> {
    use crate::error::AuthError;
    use totp_rs::{Algorithm, Secret, TOTP};

    let secret = Secret::Encoded(setup_key.to_string())
        .to_bytes()
        .map_err(|e| AuthError::Otp(format!("invalid setup key: {:?}", e)))?;

    // Kraken keys use the authenticator defaults: SHA-1, 6 digits, 30 s step
    TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, secret)
        .generate_current()
        .map_err(|e| AuthError::Otp(e.to_string()))
}

impl Clone for SecondFactor {
    fn clone(&self) -> Self {
        match self {
            Self::StaticPassword(password) => Self::static_password(password.expose_secret()),
            #[cfg(feature = "totp")]
            Self::AuthenticatorApp(setup_key) => Self::authenticator_app(setup_key.expose_secret()),
            Self::External(generator) => Self::External(Arc::clone(generator)),
        }
    }
}

impl std::fmt::Debug for SecondFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondFactor")
            .field("method", &self.method())
            .finish()
    }
}
