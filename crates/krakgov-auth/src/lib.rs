//! Request signing for Kraken's private REST API
//!
//! This crate is the leaf of the workspace: it knows how to turn an API key,
//! a base64 private key and a set of form parameters into the `API-Key` and
//! `API-Sign` headers Kraken expects. It performs no I/O.
//!
//! # Example
//!
//! ```
//! use krakgov_auth::{Credentials, Signer};
//!
//! let creds = Credentials::new("API_KEY", "dGVzdF9wcml2YXRlX2tleQ==");
//! let signer = Signer::new(creds);
//!
//! let params = vec![("asset".to_string(), "ZEUR".to_string())];
//! let signed = signer.sign_request("/0/private/TradeBalance", &params)?;
//! assert!(signed.body.starts_with("asset=ZEUR&nonce="));
//! # Ok::<(), krakgov_auth::AuthError>(())
//! ```

mod credentials;
mod error;
mod nonce;
mod otp;
mod signer;

pub use credentials::{Credentials, API_KEY_ENV, PRIVATE_KEY_ENV};
pub use error::{AuthError, AuthResult};
pub use nonce::NonceSource;
pub use otp::{OtpGenerator, SecondFactor};
pub use signer::{sign, sign_encoded, SignedRequest, Signer};
