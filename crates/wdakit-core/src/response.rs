//! The JSON envelope WDA wraps around every reply.
//!
//! Every response has the shape
//!
//! ```text
//! {"value": <payload or error object>, "sessionId": "<id>", "status": 0}
//! ```
//!
//! A successful call carries its result in `value`. A failed call carries an
//! object with `error` and `message` keys in `value` (W3C style) or, on older
//! servers, a non-zero top-level `status` (JSON Wire Protocol style). The
//! envelope is created per call, checked with
//! [`into_result`](WdaResponse::into_result), then decoded and dropped.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, WdaError};

/// Legacy JSON Wire Protocol status code for "no such element".
const LEGACY_NO_SUCH_ELEMENT: i64 = 7;

/// A decoded WDA response envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WdaResponse {
    /// The payload (or error object).
    #[serde(default)]
    pub value: Value,

    /// The session the response belongs to, if the server reported one.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,

    /// JSON Wire Protocol status code (`0` on success), only sent by old servers.
    #[serde(default)]
    pub status: Option<i64>,

    /// HTTP status code of the reply. Not part of the JSON body.
    #[serde(skip)]
    pub http_status: u16,
}

impl WdaResponse {
    /// Parses a raw HTTP reply body.
    ///
    /// An empty body on a successful status is treated as `{"value": null}`.
    /// A body that is not JSON on a failing status becomes a
    /// [`WdaError::Server`] carrying the text; on a successful status it is a
    /// [`WdaError::Decode`].
    pub fn parse(http_status: u16, body: &str) -> Result<Self> {
        let success = (200..300).contains(&http_status);
        if body.trim().is_empty() {
            return if success {
                Ok(Self {
                    http_status,
                    ..Self::default()
                })
            } else {
                Err(WdaError::Server {
                    error: format!("http {http_status}"),
                    message: String::new(),
                })
            };
        }

        match serde_json::from_str::<WdaResponse>(body) {
            Ok(mut response) => {
                response.http_status = http_status;
                Ok(response)
            }
            Err(_) if !success => Err(WdaError::Server {
                error: format!("http {http_status}"),
                message: body.trim().to_string(),
            }),
            Err(e) => Err(WdaError::Decode(format!("invalid response envelope: {e}"))),
        }
    }

    /// Builds an envelope around a payload, as a server would on success.
    pub fn with_value(value: Value) -> Self {
        Self {
            value,
            http_status: 200,
            ..Self::default()
        }
    }

    /// Returns the embedded server error, if the envelope reports one.
    ///
    /// The `value.error` string wins over the legacy `status`, which wins over
    /// a bare non-2xx HTTP status.
    pub fn server_error(&self) -> Option<WdaError> {
        if let Some(obj) = self.value.as_object() {
            let error = obj.get("error").and_then(Value::as_str).unwrap_or_default();
            if !error.is_empty() {
                let message = obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Some(WdaError::Server {
                    error: error.to_string(),
                    message,
                });
            }
        }

        match self.status {
            Some(0) | None => {}
            Some(code) => {
                let error = if code == LEGACY_NO_SUCH_ELEMENT {
                    "no such element".to_string()
                } else {
                    format!("status {code}")
                };
                let message = self
                    .value
                    .get("description")
                    .or_else(|| self.value.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| self.value.as_str().map(str::to_string))
                    .unwrap_or_default();
                return Some(WdaError::Server { error, message });
            }
        }

        if self.http_status != 0 && !(200..300).contains(&self.http_status) {
            return Some(WdaError::Server {
                error: format!("http {}", self.http_status),
                message: self.value.to_string(),
            });
        }

        None
    }

    /// Consumes the envelope, failing if it carries a server-reported error.
    pub fn into_result(self) -> Result<Self> {
        match self.server_error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Borrow the payload.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Decodes the payload into a plain serde type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.value).map_err(|e| WdaError::Decode(e.to_string()))
    }

    /// Decodes the payload into a type that keeps the raw JSON it came from.
    pub fn decode_raw<T: RetainsRaw>(&self) -> Result<T> {
        decode_raw_value(&self.value)
    }

    /// Interprets the payload as a boolean.
    pub fn bool_value(&self) -> Result<bool> {
        self.value
            .as_bool()
            .ok_or_else(|| WdaError::Decode(format!("expected boolean value, got {}", self.value)))
    }
}

/// A decoded payload type that also stores the JSON text it was parsed from.
///
/// The raw text is attached once, right after parsing, and never changes.
pub trait RetainsRaw: DeserializeOwned {
    /// Attach the raw JSON text to a freshly decoded value.
    fn with_raw(self, raw: String) -> Self;

    /// The JSON text this value was decoded from.
    fn raw(&self) -> &str;
}

/// Decodes any JSON value into a [`RetainsRaw`] type.
pub(crate) fn decode_raw_value<T: RetainsRaw>(value: &Value) -> Result<T> {
    let raw = value.to_string();
    let decoded: T = serde_json::from_str(&raw)?;
    Ok(decoded.with_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_success_envelope() {
        let resp = WdaResponse::parse(200, r#"{"value":{"width":812,"height":375},"sessionId":"S1"}"#)
            .unwrap();
        assert_eq!(resp.session_id.as_deref(), Some("S1"));
        assert_eq!(resp.value["width"], 812);
        assert!(resp.into_result().is_ok());
    }

    #[test]
    fn parse_empty_body_is_null_value() {
        let resp = WdaResponse::parse(200, "").unwrap();
        assert!(resp.value.is_null());
    }

    #[test]
    fn parse_garbage_on_success_is_decode_error() {
        let err = WdaResponse::parse(200, "<html>").unwrap_err();
        assert!(matches!(err, WdaError::Decode(_)));
    }

    #[test]
    fn parse_garbage_on_failure_is_server_error() {
        let err = WdaResponse::parse(502, "Bad Gateway").unwrap_err();
        match err {
            WdaError::Server { error, message } => {
                assert_eq!(error, "http 502");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Server, got: {other:?}"),
        }
    }

    #[test]
    fn embedded_error_object_is_server_error() {
        let resp = WdaResponse::parse(
            404,
            r#"{"value":{"error":"no such element","message":"unable to find","traceback":""}}"#,
        )
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.is_no_such_element());
    }

    #[test]
    fn embedded_error_wins_even_with_ok_http_status() {
        let resp = WdaResponse::with_value(json!({"error": "invalid session id", "message": "gone"}));
        match resp.into_result() {
            Err(WdaError::Server { error, message }) => {
                assert_eq!(error, "invalid session id");
                assert_eq!(message, "gone");
            }
            other => panic!("expected Server, got: {other:?}"),
        }
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        let resp = WdaResponse::with_value(json!({"error": "", "level": 1}));
        assert!(resp.into_result().is_ok());
    }

    #[test]
    fn legacy_status_seven_maps_to_no_such_element() {
        let resp = WdaResponse::parse(
            200,
            r#"{"value":{"using":"id","value":"x","description":"unable to find an element"},"status":7}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(WdaError::Server { error, message }) => {
                assert_eq!(error, "no such element");
                assert_eq!(message, "unable to find an element");
            }
            other => panic!("expected Server, got: {other:?}"),
        }
    }

    #[test]
    fn legacy_status_zero_is_success() {
        let resp = WdaResponse::parse(200, r#"{"value":true,"status":0}"#).unwrap();
        assert!(resp.into_result().unwrap().bool_value().unwrap());
    }

    #[test]
    fn bare_http_failure_without_error_object() {
        let resp = WdaResponse::parse(500, r#"{"value":null}"#).unwrap();
        assert!(matches!(resp.into_result(), Err(WdaError::Server { .. })));
    }

    #[test]
    fn bool_value_rejects_other_shapes() {
        let resp = WdaResponse::with_value(json!(1));
        assert!(matches!(resp.bool_value(), Err(WdaError::Decode(_))));
    }
}
