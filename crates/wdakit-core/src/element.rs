//! Element locators and element handles.
//!
//! A [`Locator`] is the `{using, value}` pair sent to `/element` and
//! `/elements`. An [`Element`] is the opaque handle the server hands back: its
//! id plus a URL joined from the session URL, valid until the session ends.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::body::WdaBody;
use crate::error::{Result, WdaError};

/// Key WDA uses for element references in JSON Wire Protocol replies.
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Key W3C WebDriver uses for element references.
const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A search strategy and query for finding elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    /// The strategy name, e.g. `"class chain"` or `"accessibility id"`.
    pub using: String,
    /// The query, interpreted according to `using`.
    pub value: String,
}

impl Locator {
    /// Builds a locator from an arbitrary strategy name.
    pub fn new(using: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            using: using.into(),
            value: value.into(),
        }
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new("accessibility id", value)
    }

    /// Match by `XCUIElementType` name, e.g. `XCUIElementTypeButton`.
    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new("class name", value)
    }

    /// Match with an XCTest class chain query, e.g. `**/XCUIElementTypeCell[2]`.
    pub fn class_chain(value: impl Into<String>) -> Self {
        Self::new("class chain", value)
    }

    /// Match with an `NSPredicate` format string.
    pub fn predicate(value: impl Into<String>) -> Self {
        Self::new("predicate string", value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new("name", value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new("link text", value)
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new("partial link text", value)
    }

    /// Match with an XPath query. Slow on large trees.
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new("xpath", value)
    }

    /// The request body for a find call.
    pub fn to_body(&self) -> WdaBody {
        WdaBody::new()
            .set("using", self.using.as_str())
            .set("value", self.value.as_str())
    }
}

/// A handle to a UI element returned by a find call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: String,
    url: Url,
}

impl Element {
    /// Creates a handle for `id` under `session_url` (`<session>/element/<id>`).
    pub(crate) fn new(session_url: &Url, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut url = session_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["element", id.as_str()]);
        }
        Self { id, url }
    }

    /// The server-assigned element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The element's URL (`<session>/element/<id>`).
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Extracts an element id from one element reference object.
///
/// Returns `None` if neither reference key is present or the id is empty.
pub(crate) fn element_id(reference: &Value) -> Option<&str> {
    reference
        .get(LEGACY_ELEMENT_KEY)
        .or_else(|| reference.get(W3C_ELEMENT_KEY))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Decodes the payload of `/element` into a single handle.
pub(crate) fn decode_element(session_url: &Url, value: &Value) -> Result<Element> {
    element_id(value)
        .map(|id| Element::new(session_url, id))
        .ok_or(WdaError::NoSuchElement)
}

/// Decodes the payload of `/elements` into handles, failing on an empty set.
pub(crate) fn decode_elements(session_url: &Url, value: &Value) -> Result<Vec<Element>> {
    let references = match value {
        Value::Array(items) => items,
        Value::Null => return Err(WdaError::NoSuchElement),
        other => {
            return Err(WdaError::Decode(format!(
                "expected an array of element references, got {other}"
            )))
        }
    };

    if references.is_empty() {
        return Err(WdaError::NoSuchElement);
    }

    references
        .iter()
        .map(|reference| {
            element_id(reference)
                .map(|id| Element::new(session_url, id))
                .ok_or_else(|| WdaError::Decode(format!("invalid element reference: {reference}")))
        })
        .collect()
}
