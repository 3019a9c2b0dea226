//! Ordered JSON request bodies.
//!
//! [`WdaBody`] accumulates the fields of one outgoing request through
//! chainable setters and is serialized once, when the transport sends it.
//! Field order is insertion order; setting an existing key replaces the value
//! in place.
//!
//! # Example
//!
//! ```
//! use wdakit_core::body::WdaBody;
//!
//! let body = WdaBody::new()
//!     .set_bundle_id("com.apple.Preferences")
//!     .set("shouldWaitForQuiescence", true);
//!
//! assert_eq!(
//!     body.to_string(),
//!     r#"{"bundleId":"com.apple.Preferences","shouldWaitForQuiescence":true}"#
//! );
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// An ordered mapping from field name to JSON value for one WDA request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WdaBody {
    fields: Map<String, Value>,
}

impl WdaBody {
    /// Creates an empty body (serializes as `{}`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the `bundleId` field.
    pub fn set_bundle_id(self, bundle_id: &str) -> Self {
        self.set("bundleId", bundle_id)
    }

    /// Sets the `x` and `y` coordinate fields.
    pub fn set_xy(self, x: i32, y: i32) -> Self {
        self.set("x", x).set("y", y)
    }

    /// Sets `value` to the text split into single-character strings, which is
    /// the shape `/wda/keys` expects.
    pub fn set_send_keys(self, text: &str) -> Self {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        self.set("value", chars)
    }

    /// Appends every field of `other`, replacing keys that already exist.
    pub fn merge(mut self, other: WdaBody) -> Self {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
        self
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the body into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl fmt::Display for WdaBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.fields).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_serializes_as_object() {
        assert_eq!(WdaBody::new().to_string(), "{}");
        assert!(WdaBody::new().is_empty());
    }

    #[test]
    fn fields_keep_insertion_order() {
        let body = WdaBody::new().set("using", "class name").set("value", "XCUIElementTypeButton");
        assert_eq!(
            body.to_string(),
            r#"{"using":"class name","value":"XCUIElementTypeButton"}"#
        );
    }

    #[test]
    fn set_replaces_in_place() {
        let body = WdaBody::new().set("a", 1).set("b", 2).set("a", 3);
        assert_eq!(body.to_string(), r#"{"a":3,"b":2}"#);
    }

    #[test]
    fn set_takes_json_values_as_is() {
        let settings = json!({"snapshotMaxDepth": 50, "useFirstMatch": true});
        let body = WdaBody::new().set("settings", settings.clone()).set("missing", Value::Null);
        assert_eq!(body.get("settings"), Some(&settings));
        assert_eq!(body.to_string(), r#"{"settings":{"snapshotMaxDepth":50,"useFirstMatch":true},"missing":null}"#);
    }

    #[test]
    fn xy_and_bundle_helpers() {
        let body = WdaBody::new().set_xy(10, -4).set_bundle_id("com.example.App");
        assert_eq!(
            body.into_value(),
            json!({"x": 10, "y": -4, "bundleId": "com.example.App"})
        );
    }

    #[test]
    fn send_keys_splits_into_characters() {
        let body = WdaBody::new().set_send_keys("hé\n");
        assert_eq!(body.get("value"), Some(&json!(["h", "é", "\n"])));
    }

    #[test]
    fn merge_appends_and_overrides() {
        let base = WdaBody::new().set_bundle_id("a.b").set("duration", 1.0);
        let extra = WdaBody::new().set("duration", 2.5).set("arguments", vec!["-x"]);
        let merged = base.merge(extra);
        assert_eq!(
            merged.to_string(),
            r#"{"bundleId":"a.b","duration":2.5,"arguments":["-x"]}"#
        );
    }
}
