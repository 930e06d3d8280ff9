//! HMAC-SHA512 request signing
//!
//! Kraken signature algorithm:
//! 1. form-encode the POST parameters (which already contain `nonce`)
//! 2. SHA256(nonce + POST data)
//! 3. HMAC-SHA512(decoded private key, URI path + SHA256 result)
//! 4. Base64 encode the MAC

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use tracing::trace;

use crate::credentials::{decode_secret, Credentials};
use crate::error::{AuthError, AuthResult};
use crate::nonce::NonceSource;
use crate::otp::SecondFactor;

type HmacSha512 = Hmac<Sha512>;

/// Sign a request
///
/// `secret` is the base64 private key and `params` must already contain the
/// `nonce` field matching `nonce`. Parameters are encoded in the given order,
/// which must be the order of the body actually posted.
///
/// # Errors
/// [`AuthError::InvalidCredentials`] if `secret` is not valid base64.
pub fn sign<K, V>(secret: &str, nonce: u64, path: &str, params: &[(K, V)]) -> AuthResult<String>
where
    K: Serialize,
    V: Serialize,
{
    let key = decode_secret(secret)?;
    let body = serde_urlencoded::to_string(params)?;
    sign_encoded(&key, nonce, path, &body)
}

/// Sign an already form-encoded body with a decoded key
pub fn sign_encoded(key: &[u8], nonce: u64, path: &str, body: &str) -> AuthResult<String> {
    // Step 1: SHA256(nonce + post_data)
    let mut sha256 = Sha256::new();
    sha256.update(nonce.to_string().as_bytes());
    sha256.update(body.as_bytes());
    let digest = sha256.finalize();

    // Step 2: message = path + SHA256_result
    let mut message = path.as_bytes().to_vec();
    message.extend_from_slice(&digest);

    // Step 3: HMAC-SHA512(private_key, message)
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
    mac.update(&message);

    // Step 4: Base64 encode
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// A private request ready to hand to the transport
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Nonce embedded in the body
    pub nonce: u64,
    /// Form-encoded body, byte-for-byte what was signed
    pub body: String,
    /// `API-Key` header value
    pub api_key: String,
    /// `API-Sign` header value
    pub signature: String,
}

impl SignedRequest {
    /// Authentication headers for the request
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("API-Key".to_string(), self.api_key.clone()),
            ("API-Sign".to_string(), self.signature.clone()),
        ]
    }
}

/// Signs private requests for one credential set
///
/// Owns the nonce source for those credentials, so two signers built from the
/// same key do not share nonce state.
#[derive(Debug)]
pub struct Signer {
    credentials: Credentials,
    second_factor: Option<SecondFactor>,
    nonces: NonceSource,
}

impl Signer {
    /// Create a signer
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            second_factor: None,
            nonces: NonceSource::new(),
        }
    }

    /// Attach a second factor; every request then carries an `otp` field
    pub fn with_second_factor(mut self, second_factor: SecondFactor) -> Self {
        self.second_factor = Some(second_factor);
        self
    }

    /// Get the credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the configured second factor
    pub fn second_factor(&self) -> Option<&SecondFactor> {
        self.second_factor.as_ref()
    }

    /// Verify the credentials can sign, without consuming a nonce
    pub fn check(&self) -> AuthResult<()> {
        self.credentials.decode_private_key().map(|_| ())
    }

    /// Sign `params` for `path`
    ///
    /// Appends `nonce` (and `otp` when a second factor is configured) after
    /// the caller's parameters, encodes the body once and signs exactly that
    /// body.
    pub fn sign_request(&self, path: &str, params: &[(String, String)]) -> AuthResult<SignedRequest> {
        let key = self.credentials.decode_private_key()?;
        let nonce = self.nonces.next();

        let mut fields: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        fields.push(("nonce", nonce.to_string()));
        if let Some(factor) = &self.second_factor {
            fields.push(("otp", factor.code()?));
        }

        let body = serde_urlencoded::to_string(&fields)?;
        let signature = sign_encoded(&key, nonce, path, &body)?;

        trace!(path, nonce, "signed private request");

        Ok(SignedRequest {
            nonce,
            body,
            api_key: self.credentials.api_key().to_string(),
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

    fn order_params(nonce: u64) -> Vec<(&'static str, String)> {
        vec![
            ("nonce", nonce.to_string()),
            ("ordertype", "limit".to_string()),
            ("pair", "XBTUSD".to_string()),
            ("price", "37500".to_string()),
            ("type", "buy".to_string()),
            ("volume", "1.25".to_string()),
        ]
    }

    #[test]
    fn test_matches_published_example() {
        // Example from Kraken's REST authentication documentation
        let signature = sign(SECRET, 1616492376594, "/0/private/AddOrder", &order_params(1616492376594)).unwrap();
        assert_eq!(
            signature,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = sign(SECRET, 1, "/0/private/Balance", &[("nonce", "1")]).unwrap();
        let b = sign(SECRET, 1, "/0/private/Balance", &[("nonce", "1")]).unwrap();
        assert_eq!(a, b);
        assert!(BASE64.decode(&a).is_ok());
    }

    #[test]
    fn test_every_input_changes_signature() {
        let base = sign(SECRET, 1, "/0/private/Balance", &[("nonce", "1"), ("asset", "ZEUR")]).unwrap();

        let other_nonce = sign(SECRET, 2, "/0/private/Balance", &[("nonce", "1"), ("asset", "ZEUR")]).unwrap();
        let other_path = sign(SECRET, 1, "/0/private/TradeBalance", &[("nonce", "1"), ("asset", "ZEUR")]).unwrap();
        let other_param = sign(SECRET, 1, "/0/private/Balance", &[("nonce", "1"), ("asset", "ZUSD")]).unwrap();

        assert_ne!(base, other_nonce);
        assert_ne!(base, other_path);
        assert_ne!(base, other_param);
    }

    #[test]
    fn test_invalid_secret_fails() {
        let result = sign("***", 1, "/0/private/Balance", &[("nonce", "1")]);
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[test]
    fn test_signer_body_matches_signature() {
        let signer = Signer::new(Credentials::new("API_KEY", SECRET));
        let params = vec![("asset".to_string(), "ZEUR".to_string())];
        let signed = signer.sign_request("/0/private/TradeBalance", &params).unwrap();

        assert_eq!(signed.body, format!("asset=ZEUR&nonce={}", signed.nonce));
        let expected = sign(
            SECRET,
            signed.nonce,
            "/0/private/TradeBalance",
            &[("asset", "ZEUR".to_string()), ("nonce", signed.nonce.to_string())],
        )
        .unwrap();
        assert_eq!(signed.signature, expected);
        assert_eq!(signed.api_key, "API_KEY");
    }

    #[test]
    fn test_signer_fresh_nonce_per_request() {
        let signer = Signer::new(Credentials::new("API_KEY", SECRET));
        let first = signer.sign_request("/0/private/Balance", &[]).unwrap();
        let second = signer.sign_request("/0/private/Balance", &[]).unwrap();
        assert!(second.nonce > first.nonce);
        assert_ne!(first.signature, second.signature);
    }

    #[test]
    fn test_signer_appends_otp() {
        let signer = Signer::new(Credentials::new("API_KEY", SECRET))
            .with_second_factor(SecondFactor::static_password("pw"));
        let signed = signer.sign_request("/0/private/Balance", &[]).unwrap();
        assert!(signed.body.ends_with("&otp=pw"));
    }

    #[test]
    fn test_signer_check_rejects_empty_secret() {
        let signer = Signer::new(Credentials::new("API_KEY", ""));
        assert!(matches!(signer.check(), Err(AuthError::MissingCredentials)));
        assert!(signer.sign_request("/0/private/Balance", &[]).is_err());
    }

    #[test]
    fn test_headers() {
        let signer = Signer::new(Credentials::new("API_KEY", SECRET));
        let signed = signer.sign_request("/0/private/Balance", &[]).unwrap();
        let headers = signed.headers();
        assert_eq!(headers[0], ("API-Key".to_string(), "API_KEY".to_string()));
        assert_eq!(headers[1].0, "API-Sign");
    }
}
