//! Typed client for one WebDriverAgent session.
//!
//! A [`Session`] wraps the URL of a live WDA session
//! (`http://<host>:<port>/session/<id>`) and exposes one async method per
//! endpoint. Each method builds a [`WdaBody`], sends it through the session's
//! [`Transport`], rejects envelopes that carry a server error, and decodes the
//! `value` payload.
//!
//! The session URL is fixed at construction. Sessions are created by the WDA
//! server (for example by an XCTest runner or an Appium driver); this client
//! only drives an existing one.
//!
//! # Example
//!
//! ```no_run
//! use wdakit_core::element::Locator;
//! use wdakit_core::session::{AppLaunchOptions, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new("http://localhost:8100/session/8BF16568")?;
//!
//! session.app_launch("com.apple.Preferences", None).await?;
//! session
//!     .app_launch(
//!         "com.example.App",
//!         Some(AppLaunchOptions::new().arguments(["-debug"]).should_wait_for_quiescence(false)),
//!     )
//!     .await?;
//!
//! let general = session.find_element(&Locator::accessibility_id("General")).await?;
//! println!("found {}", general.id());
//!
//! let battery = session.battery_info().await?;
//! println!("{:.0}% ({})", battery.level * 100.0, battery.state);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::body::WdaBody;
use crate::config::WdaConfig;
use crate::element::{decode_element, decode_elements, Element, Locator};
use crate::error::{Result, WdaError};
use crate::response::{decode_raw_value, WdaResponse};
use crate::shared::{self, endpoint, SourceOptions};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    ActiveAppInfo, AppBaseInfo, AppRunState, BatteryInfo, DeviceInfo, Screen, SessionInfo, Size,
};

/// Default hold duration for [`Session::touch_and_hold`], in seconds.
const DEFAULT_TOUCH_AND_HOLD_SECS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Option and name types
// ---------------------------------------------------------------------------

/// Options for [`Session::app_launch`].
///
/// Only the fields that were set are sent. Passing `None` to `app_launch`
/// is the same as passing `AppLaunchOptions::new().should_wait_for_quiescence(true)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppLaunchOptions {
    body: WdaBody,
}

impl AppLaunchOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether WDA waits for the app's UI to go idle before returning and
    /// while performing queries.
    pub fn should_wait_for_quiescence(self, wait: bool) -> Self {
        Self {
            body: self.body.set("shouldWaitForQuiescence", wait),
        }
    }

    /// Command line arguments. Only applied if the app was not already running.
    pub fn arguments<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        Self {
            body: self.body.set("arguments", args),
        }
    }

    /// Environment variables. Only applied if the app was not already running.
    pub fn environment(self, env: HashMap<String, String>) -> Self {
        let env: Map<String, Value> = env.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
        Self {
            body: self.body.set("environment", env),
        }
    }

    fn into_body(self) -> WdaBody {
        self.body
    }
}

/// Pasteboard content kinds accepted by `/wda/setPasteboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Plaintext,
    Image,
    Url,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Plaintext => "plaintext",
            ContentType::Image => "image",
            ContentType::Url => "url",
        }
    }
}

impl From<ContentType> for Value {
    fn from(content_type: ContentType) -> Self {
        Value::from(content_type.as_str())
    }
}

/// Hardware buttons accepted by `/wda/pressButton`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceButton {
    Home,
    VolumeUp,
    VolumeDown,
}

impl DeviceButton {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceButton::Home => "home",
            DeviceButton::VolumeUp => "volumeUp",
            DeviceButton::VolumeDown => "volumeDown",
        }
    }
}

impl From<DeviceButton> for Value {
    fn from(button: DeviceButton) -> Self {
        Value::from(button.as_str())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A handle to a live WDA session.
///
/// Holds only the immutable session URL and a shared transport, so it is
/// cheap to clone and safe to use from several tasks. Concurrent calls are
/// sequenced (or rejected) by the server.
#[derive(Clone)]
pub struct Session {
    url: Url,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("url", &self.url.as_str()).finish()
    }
}

impl Session {
    /// Creates a session handle using a default [`HttpTransport`].
    pub fn new(url: &str) -> Result<Self> {
        Self::with_transport(url, Arc::new(HttpTransport::new()?))
    }

    /// Creates a session handle that sends requests through `transport`.
    ///
    /// Fails with [`WdaError::InvalidArgument`] if `url` does not parse or
    /// cannot carry a path (e.g. `mailto:`).
    pub fn with_transport(url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| WdaError::InvalidArgument(format!("invalid session URL {url:?}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(WdaError::InvalidArgument(format!(
                "session URL cannot be a base: {url}"
            )));
        }
        Ok(Self { url, transport })
    }

    /// Creates a session handle from the URL and timeouts in `config`.
    pub fn from_config(config: &WdaConfig) -> Result<Self> {
        let url = config
            .session_url
            .as_deref()
            .ok_or_else(|| WdaError::InvalidArgument("config has no session_url".into()))?;
        let transport = HttpTransport::from_config(config)?;
        Self::with_transport(url, Arc::new(transport))
    }

    /// The session URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    // -----------------------------------------------------------------------
    // Request helpers
    // -----------------------------------------------------------------------

    async fn get(&self, name: &'static str, path: &str) -> Result<WdaResponse> {
        let url = endpoint(&self.url, path);
        self.transport.get(name, &url).await?.into_result()
    }

    async fn post(&self, name: &'static str, path: &str, body: &WdaBody) -> Result<WdaResponse> {
        let url = endpoint(&self.url, path);
        self.transport.post(name, &url, body).await?.into_result()
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Fetches the session descriptor.
    ///
    /// Fails with [`WdaError::NoSuchElement`] if the server reports no
    /// active session payload.
    pub async fn get_active_session(&self) -> Result<SessionInfo> {
        let response = self.get("get_active_session", "").await?;
        if response.value().is_null() {
            return Err(WdaError::NoSuchElement);
        }
        response.decode_raw()
    }

    /// Deletes the session. The server also terminates the app under test.
    pub async fn delete_session(&self) -> Result<()> {
        let url = endpoint(&self.url, "");
        self.transport
            .delete("delete_session", &url)
            .await?
            .into_result()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Apps
    // -----------------------------------------------------------------------

    /// Launches (or activates, if already running) the app `bundle_id`.
    ///
    /// The bundle id is sent as is. WDA can get into a bad state when asked
    /// to launch a bundle id that is not installed, making later calls fail.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn app_launch(&self, bundle_id: &str, options: Option<AppLaunchOptions>) -> Result<()> {
        let options =
            options.unwrap_or_else(|| AppLaunchOptions::new().should_wait_for_quiescence(true));
        let body = WdaBody::new()
            .set_bundle_id(bundle_id)
            .merge(options.into_body());
        self.post("app_launch", "/wda/apps/launch", &body).await?;
        Ok(())
    }

    /// Terminates the app. Returns `false` if it was not running.
    #[instrument(skip(self), level = "debug")]
    pub async fn app_terminate(&self, bundle_id: &str) -> Result<bool> {
        let body = WdaBody::new().set_bundle_id(bundle_id);
        self.post("app_terminate", "/wda/apps/terminate", &body)
            .await?
            .bool_value()
    }

    /// Brings a backgrounded app to the foreground. No-op if already there.
    #[instrument(skip(self), level = "debug")]
    pub async fn app_activate(&self, bundle_id: &str) -> Result<()> {
        let body = WdaBody::new().set_bundle_id(bundle_id);
        self.post("app_activate", "/wda/apps/activate", &body).await?;
        Ok(())
    }

    /// Sends the app under test to the background for `duration` seconds,
    /// then reactivates it. The server picks the duration if `None`.
    pub async fn app_deactivate(&self, duration: Option<f64>) -> Result<()> {
        let mut body = WdaBody::new();
        if let Some(duration) = duration {
            body = body.set("duration", duration);
        }
        self.post("app_deactivate", "/wda/deactivateApp", &body).await?;
        Ok(())
    }

    /// Queries the run state of `bundle_id`.
    pub async fn app_state(&self, bundle_id: &str) -> Result<AppRunState> {
        let body = WdaBody::new().set_bundle_id(bundle_id);
        let response = self.post("app_state", "/wda/apps/state", &body).await?;
        let state: AppRunState = response.decode()?;
        debug!(bundle_id, %state, "app state");
        Ok(state)
    }

    /// The app currently in the foreground.
    pub async fn active_app_info(&self) -> Result<ActiveAppInfo> {
        shared::active_app_info(self.transport.as_ref(), &self.url).await
    }

    /// All apps currently on screen (more than one with iPad multitasking).
    ///
    /// An empty list is returned as is, not as an error.
    pub async fn active_apps_list(&self) -> Result<Vec<AppBaseInfo>> {
        let response = self.get("active_apps_list", "/wda/apps/list").await?;
        match response.value() {
            Value::Array(items) => items.iter().map(decode_raw_value::<AppBaseInfo>).collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(WdaError::Decode(format!("expected an array of apps, got {other}"))),
        }
    }

    // -----------------------------------------------------------------------
    // Gestures and keys
    // -----------------------------------------------------------------------

    /// Taps at `(x, y)` via `/wda/tap/0`.
    pub async fn tap(&self, x: i32, y: i32) -> Result<()> {
        let body = WdaBody::new().set_xy(x, y);
        self.post("tap", "/wda/tap/0", &body).await?;
        Ok(())
    }

    /// Double taps at `(x, y)` via `/wda/doubleTap`.
    pub async fn double_tap(&self, x: i32, y: i32) -> Result<()> {
        let body = WdaBody::new().set_xy(x, y);
        self.post("double_tap", "/wda/doubleTap", &body).await?;
        Ok(())
    }

    /// Touches and holds at `(x, y)` for `duration` seconds (1.0 if `None`).
    pub async fn touch_and_hold(&self, x: i32, y: i32, duration: Option<f64>) -> Result<()> {
        let body = WdaBody::new()
            .set_xy(x, y)
            .set("duration", duration.unwrap_or(DEFAULT_TOUCH_AND_HOLD_SECS));
        self.post("touch_and_hold", "/wda/touchAndHold", &body).await?;
        Ok(())
    }

    /// Types `text` into the focused element. Use `"\n"` for the return key.
    ///
    /// WDA may wait several seconds per character when no keyboard is focused
    /// and does not always report typing failures.
    #[instrument(skip(self, text), fields(chars = text.chars().count()), level = "debug")]
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        let body = WdaBody::new().set_send_keys(text);
        self.post("send_keys", "/wda/keys", &body).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// Finds the first element matching `locator`.
    #[instrument(skip(self), level = "debug")]
    pub async fn find_element(&self, locator: &Locator) -> Result<Element> {
        let response = self
            .post("find_element", "/element", &locator.to_body())
            .await
            .map_err(no_such_element)?;
        decode_element(&self.url, response.value())
    }

    /// Finds every element matching `locator`, in server order.
    ///
    /// Fails with [`WdaError::NoSuchElement`] rather than returning an empty
    /// list.
    #[instrument(skip(self), level = "debug")]
    pub async fn find_elements(&self, locator: &Locator) -> Result<Vec<Element>> {
        let response = self
            .post("find_elements", "/elements", &locator.to_body())
            .await
            .map_err(no_such_element)?;
        let elements = decode_elements(&self.url, response.value())?;
        debug!(count = elements.len(), "elements found");
        Ok(elements)
    }

    // -----------------------------------------------------------------------
    // Device and screen
    // -----------------------------------------------------------------------

    /// Device model, locale, and UI style from `/wda/device/info`.
    pub async fn device_info(&self) -> Result<DeviceInfo> {
        self.get("device_info", "/wda/device/info").await?.decode_raw()
    }

    /// Charge level and state from `/wda/batteryInfo`.
    pub async fn battery_info(&self) -> Result<BatteryInfo> {
        self.get("battery_info", "/wda/batteryInfo").await?.decode_raw()
    }

    /// Size of the app window in points, from `/window/size`.
    pub async fn window_size(&self) -> Result<Size> {
        self.get("window_size", "/window/size").await?.decode_raw()
    }

    /// Screen scale and status bar size.
    pub async fn screen(&self) -> Result<Screen> {
        let response = self.get("screen", "/wda/screen").await?;
        let screen: Screen = response.decode_raw()?;
        let status_bar_raw = response
            .value()
            .get("statusBarSize")
            .map(Value::to_string)
            .unwrap_or_default();
        Ok(screen.with_status_bar_raw(status_bar_raw))
    }

    /// Screen scale factor. Same request and errors as [`Session::screen`].
    pub async fn scale(&self) -> Result<f64> {
        Ok(self.screen().await?.scale)
    }

    /// Status bar size. Same request and errors as [`Session::screen`].
    pub async fn status_bar_size(&self) -> Result<Size> {
        Ok(self.screen().await?.status_bar_size)
    }

    /// Captures the screen as PNG bytes.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let response = self.get("screenshot", "/screenshot").await?;
        let encoded = response
            .value()
            .as_str()
            .ok_or_else(|| WdaError::Decode("expected base64 screenshot string".into()))?;
        // WDA wraps long base64 output in some versions.
        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| WdaError::Decode(format!("invalid screenshot base64: {e}")))
    }

    // -----------------------------------------------------------------------
    // Lock screen
    // -----------------------------------------------------------------------

    /// Whether the screen is locked, from `/wda/locked`.
    pub async fn is_locked(&self) -> Result<bool> {
        shared::is_locked(self.transport.as_ref(), &self.url).await
    }

    /// Unlocks the device. Returns immediately if it is already unlocked.
    pub async fn unlock(&self) -> Result<()> {
        shared::unlock(self.transport.as_ref(), &self.url).await
    }

    /// Locks the device. Returns immediately if it is already locked.
    pub async fn lock(&self) -> Result<()> {
        shared::lock(self.transport.as_ref(), &self.url).await
    }

    // -----------------------------------------------------------------------
    // Pasteboard
    // -----------------------------------------------------------------------

    /// Sets the general pasteboard. `content` must already be base64 encoded.
    pub async fn set_pasteboard(&self, content_type: ContentType, content: &str) -> Result<()> {
        let body = WdaBody::new()
            .set("contentType", content_type)
            .set("content", content);
        self.post("set_pasteboard", "/wda/setPasteboard", &body).await?;
        Ok(())
    }

    /// Puts `text` on the pasteboard, standard base64 encoded.
    pub async fn set_pasteboard_for_plaintext(&self, text: &str) -> Result<()> {
        let encoded = STANDARD.encode(text.as_bytes());
        self.set_pasteboard(ContentType::Plaintext, &encoded).await
    }

    /// Reads the whole image file and puts it on the pasteboard.
    ///
    /// Fails with [`WdaError::Io`] before any request if the file cannot be
    /// opened or read.
    pub async fn set_pasteboard_for_image(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "image read for pasteboard");
        let encoded = STANDARD.encode(bytes);
        self.set_pasteboard(ContentType::Image, &encoded).await
    }

    /// Puts a URL on the pasteboard, encoded with the URL-safe base64 alphabet.
    pub async fn set_pasteboard_for_url(&self, url: &str) -> Result<()> {
        let encoded = URL_SAFE.encode(url.as_bytes());
        self.set_pasteboard(ContentType::Url, &encoded).await
    }

    // -----------------------------------------------------------------------
    // Buttons and Siri
    // -----------------------------------------------------------------------

    /// Presses a hardware button. The call can return before the device has
    /// finished reacting to the press.
    pub async fn press_button(&self, button: DeviceButton) -> Result<()> {
        let body = WdaBody::new().set("name", button);
        self.post("press_button", "/wda/pressButton", &body).await?;
        Ok(())
    }

    /// Presses the home button via `/wda/pressButton`.
    pub async fn press_home_button(&self) -> Result<()> {
        self.press_button(DeviceButton::Home).await
    }

    /// Presses volume up via `/wda/pressButton`.
    pub async fn press_volume_up_button(&self) -> Result<()> {
        self.press_button(DeviceButton::VolumeUp).await
    }

    /// Presses volume down via `/wda/pressButton`.
    pub async fn press_volume_down_button(&self) -> Result<()> {
        self.press_button(DeviceButton::VolumeDown).await
    }

    /// Starts Siri voice recognition with `text` as the spoken query.
    pub async fn siri_activate(&self, text: &str) -> Result<()> {
        let body = WdaBody::new().set("text", text);
        self.post("siri_activate", "/wda/siri/activate", &body).await?;
        Ok(())
    }

    /// Asks the server to open `url`. Unreliable on many WDA builds.
    pub async fn siri_open_url(&self, url: &str) -> Result<()> {
        let body = WdaBody::new().set("url", url);
        self.post("siri_open_url", "/url", &body).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // UI tree
    // -----------------------------------------------------------------------

    /// The UI tree of the app under test, in the requested format (XML if
    /// `None`). The text is returned exactly as the server produced it.
    pub async fn source(&self, options: Option<&SourceOptions>) -> Result<String> {
        shared::source(self.transport.as_ref(), &self.url, options).await
    }

    /// The accessibility tree of the main window, from `/wda/accessibleSource`.
    pub async fn accessible_source(&self) -> Result<String> {
        shared::accessible_source(self.transport.as_ref(), &self.url).await
    }

    // -----------------------------------------------------------------------
    // Appium settings
    // -----------------------------------------------------------------------

    /// Current settings map from `/appium/settings`.
    pub async fn get_appium_settings(&self) -> Result<Map<String, Value>> {
        self.get("get_appium_settings", "/appium/settings")
            .await?
            .decode()
    }

    /// Sets one setting via `/appium/settings` and returns the full settings map.
    pub async fn set_appium_setting(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Map<String, Value>> {
        let mut settings = Map::new();
        settings.insert(key.into(), value.into());
        self.set_appium_settings(settings).await
    }

    /// Updates settings and returns the full settings map after the update.
    pub async fn set_appium_settings(&self, settings: Map<String, Value>) -> Result<Map<String, Value>> {
        let body = WdaBody::new().set("settings", settings);
        self.post("set_appium_settings", "/appium/settings", &body)
            .await?
            .decode()
    }
}

/// Maps a server "no such element" report onto [`WdaError::NoSuchElement`].
fn no_such_element(err: WdaError) -> WdaError {
    if err.is_no_such_element() {
        WdaError::NoSuchElement
    } else {
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
