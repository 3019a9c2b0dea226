//! Endpoint helpers that only need a base URL.
//!
//! Lock state, the active app, and the UI tree source are served both under a
//! session and at the server root, so they are written against any base URL
//! and a [`Transport`]. [`Session`](crate::session::Session) delegates to
//! them with its own URL.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::body::WdaBody;
use crate::error::Result;
use crate::response::WdaResponse;
use crate::transport::Transport;
use crate::types::ActiveAppInfo;

/// Joins `path` onto `base` as extra path segments.
///
/// Leading, trailing, and repeated slashes in `path` are ignored, so
/// `"/wda/apps/launch"` and `"wda/apps/launch"` give the same URL. An empty
/// `path` yields `base` without a trailing slash.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }
    url
}

/// Output format of `/source`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFormat {
    #[default]
    Xml,
    Json,
    /// `XCUIElement.debugDescription` text.
    Description,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Json => "json",
            SourceFormat::Description => "description",
        }
    }
}

/// Query options for `/source`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub format: SourceFormat,
    /// Element attributes to leave out of XML output, e.g. `visible`, `enabled`.
    pub excluded_attributes: Vec<String>,
}

impl SourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn excluded_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    fn apply(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        query.append_pair("format", self.format.as_str());
        if !self.excluded_attributes.is_empty() {
            query.append_pair("excluded_attributes", &self.excluded_attributes.join(","));
        }
    }
}

/// Renders a tree payload as text: strings pass through, anything else is
/// serialized as compact JSON.
fn tree_text(response: &WdaResponse) -> String {
    match response.value() {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) async fn is_locked(transport: &dyn Transport, base: &Url) -> Result<bool> {
    let url = endpoint(base, "/wda/locked");
    transport.get("is_locked", &url).await?.into_result()?.bool_value()
}

/// Returns immediately if already unlocked; fails if the server does not
/// reach the unlocked state before its own timeout.
pub(crate) async fn unlock(transport: &dyn Transport, base: &Url) -> Result<()> {
    let url = endpoint(base, "/wda/unlock");
    transport.post("unlock", &url, &WdaBody::new()).await?.into_result()?;
    Ok(())
}

/// Returns immediately if already locked; fails if the server does not reach
/// the locked state before its own timeout.
pub(crate) async fn lock(transport: &dyn Transport, base: &Url) -> Result<()> {
    let url = endpoint(base, "/wda/lock");
    transport.post("lock", &url, &WdaBody::new()).await?.into_result()?;
    Ok(())
}

pub(crate) async fn active_app_info(transport: &dyn Transport, base: &Url) -> Result<ActiveAppInfo> {
    let url = endpoint(base, "/wda/activeAppInfo");
    transport
        .get("active_app_info", &url)
        .await?
        .into_result()?
        .decode_raw()
}

pub(crate) async fn source(
    transport: &dyn Transport,
    base: &Url,
    options: Option<&SourceOptions>,
) -> Result<String> {
    let mut url = endpoint(base, "/source");
    if let Some(options) = options {
        options.apply(&mut url);
    }
    let response = transport.get("source", &url).await?.into_result()?;
    let text = tree_text(&response);
    debug!(bytes = text.len(), "source fetched");
    Ok(text)
}

/// The accessibility tree of the main window only.
pub(crate) async fn accessible_source(transport: &dyn Transport, base: &Url) -> Result<String> {
    let url = endpoint(base, "/wda/accessibleSource");
    let response = transport.get("accessible_source", &url).await?.into_result()?;
    Ok(tree_text(&response))
}
