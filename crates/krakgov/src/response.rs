//! Response envelope

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{RestError, RestResult};

/// Standard Kraken API response wrapper
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    /// Error messages (empty if successful)
    #[serde(default, alias = "errors")]
    pub error: Vec<String>,
    /// Result data
    #[serde(default)]
    pub result: Value,
}

impl ApiResponse {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Get the result, returning an error if the API returned errors
    pub fn into_result(self) -> RestResult<Value> {
        if self.error.is_empty() {
            Ok(self.result)
        } else {
            Err(RestError::from_api_errors(self.error))
        }
    }
}

/// Successful result of a call
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The `result` member of a JSON envelope
    Json(Value),
    /// Body that was not JSON (report downloads)
    Raw(Vec<u8>),
}

impl Payload {
    /// Interpret a successful HTTP body
    ///
    /// JSON bodies are unwrapped from the envelope and a non-empty `error`
    /// list becomes [`RestError::Api`]. Anything else is returned as raw
    /// bytes.
    pub fn from_body(body: Vec<u8>) -> RestResult<Self> {
        match serde_json::from_slice::<ApiResponse>(&body) {
            Ok(envelope) => envelope.into_result().map(Payload::Json),
            Err(_) => Ok(Payload::Raw(body)),
        }
    }

    /// JSON result, or a parse error for raw bodies
    pub fn into_json(self) -> RestResult<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Raw(body) => Err(RestError::Parse(format!(
                "expected JSON result, got {} raw bytes",
                body.len()
            ))),
        }
    }

    /// Deserialize the JSON result
    pub fn deserialize<T: DeserializeOwned>(self) -> RestResult<T> {
        let value = self.into_json()?;
        serde_json::from_value(value).map_err(|e| RestError::Parse(e.to_string()))
    }

    /// Raw bytes; JSON results are re-serialized
    pub fn into_bytes(self) -> RestResult<Vec<u8>> {
        match self {
            Self::Raw(body) => Ok(body),
            Self::Json(value) => {
                serde_json::to_vec(&value).map_err(|e| RestError::Parse(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let payload = Payload::from_body(br#"{"error":[],"result":{"unixtime":1}}"#.to_vec()).unwrap();
        assert_eq!(payload, Payload::Json(json!({"unixtime": 1})));
    }

    #[test]
    fn test_error_envelope() {
        let err = Payload::from_body(
            br#"{"result":{"status":"ok"},"error":["EOrder:Invalid price"]}"#.to_vec(),
        )
        .unwrap_err();
        assert!(err.is_exchange_error());
        assert_eq!(err.to_string(), "API error: EOrder:Invalid price");
    }

    #[test]
    fn test_errors_alias() {
        let err = Payload::from_body(br#"{"errors":["EGeneral:Invalid arguments"]}"#.to_vec())
            .unwrap_err();
        assert!(err.is_exchange_error());
    }

    #[test]
    fn test_non_json_body_is_raw() {
        let zip = vec![0x50, 0x4b, 0x03, 0x04, 0xff];
        let payload = Payload::from_body(zip.clone()).unwrap();
        assert_eq!(payload, Payload::Raw(zip.clone()));
        assert_eq!(payload.clone().into_bytes().unwrap(), zip);
        assert!(matches!(payload.into_json(), Err(RestError::Parse(_))));
    }

    #[test]
    fn test_deserialize_result() {
        #[derive(Deserialize)]
        struct Time {
            unixtime: i64,
        }

        let payload = Payload::Json(json!({"unixtime": 1688669448, "rfc1123": "x"}));
        let time: Time = payload.deserialize().unwrap();
        assert_eq!(time.unixtime, 1688669448);
    }
}
