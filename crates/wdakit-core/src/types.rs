//! Typed snapshots of session, device, and app state.
//!
//! Each struct is decoded from the `value` payload of one response and keeps
//! the raw JSON text it came from, so a surprising decode can be diagnosed
//! without issuing the request again. `Display` renders that raw text.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::RetainsRaw;

/// Implements [`RetainsRaw`] and `Display` for structs with a `raw: String` field.
macro_rules! retains_raw {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl RetainsRaw for $ty {
                fn with_raw(mut self, raw: String) -> Self {
                    self.raw = raw;
                    self
                }

                fn raw(&self) -> &str {
                    &self.raw
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.raw)
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Capabilities reported for the active session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Bundle id of the app under test.
    #[serde(rename = "CFBundleIdentifier", default)]
    pub bundle_id: String,
    /// Display name of the app under test.
    #[serde(rename = "browserName", default)]
    pub browser_name: String,
    /// Device kind, e.g. `"iphone"`.
    #[serde(default)]
    pub device: String,
    /// iOS version of the device.
    #[serde(rename = "sdkVersion", default)]
    pub sdk_version: String,
}

/// The descriptor returned by `GET /session/<id>`.
///
/// ```text
/// {
///   "sessionId": "8BF16568-832F-4A14-A137-FD0CA566FC64",
///   "capabilities": {
///     "device": "iphone",
///     "browserName": "Settings",
///     "sdkVersion": "11.4.1",
///     "CFBundleIdentifier": "com.apple.Preferences"
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(skip)]
    raw: String,
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Device descriptor from `/wda/device/info`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub current_locale: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub uuid: String,
    /// `UIUserInterfaceIdiom` raw value (0 = phone, 1 = pad, ...).
    #[serde(default)]
    pub user_interface_idiom: i64,
    /// `"light"` or `"dark"`; absent on older iOS versions.
    #[serde(default)]
    pub user_interface_style: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_simulator: bool,
    #[serde(skip)]
    raw: String,
}

/// Battery charging state as reported by `UIDevice.batteryState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BatteryState {
    /// On battery, discharging (code 1).
    Unplugged,
    /// Plugged in, less than 100% (code 2).
    Charging,
    /// Plugged in, at 100% (code 3).
    Full,
}

impl BatteryState {
    /// The numeric code WDA uses on the wire.
    pub fn code(self) -> i64 {
        match self {
            BatteryState::Unplugged => 1,
            BatteryState::Charging => 2,
            BatteryState::Full => 3,
        }
    }
}

impl TryFrom<i64> for BatteryState {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(BatteryState::Unplugged),
            2 => Ok(BatteryState::Charging),
            3 => Ok(BatteryState::Full),
            other => Err(format!("unknown battery state code: {other}")),
        }
    }
}

impl From<BatteryState> for i64 {
    fn from(state: BatteryState) -> Self {
        state.code()
    }
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BatteryState::Unplugged => "On battery, discharging",
            BatteryState::Charging => "Plugged in, less than 100%",
            BatteryState::Full => "Plugged in, at 100%",
        };
        f.write_str(text)
    }
}

/// Battery descriptor from `/wda/batteryInfo`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatteryInfo {
    /// Charge level in `[0.0, 1.0]`.
    pub level: f64,
    pub state: BatteryState,
    #[serde(skip)]
    raw: String,
}

/// A width/height pair in points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
    #[serde(skip)]
    raw: String,
}

/// Screen descriptor from `/wda/screen`.
///
/// The nested `status_bar_size` carries its own raw text (just the
/// `statusBarSize` sub-object), separate from the outer raw text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub status_bar_size: Size,
    pub scale: f64,
    #[serde(skip)]
    raw: String,
}

impl Screen {
    pub(crate) fn with_status_bar_raw(mut self, raw: String) -> Self {
        self.status_bar_size.raw = raw;
        self
    }
}

// ---------------------------------------------------------------------------
// Apps
// ---------------------------------------------------------------------------

/// Application run state returned by `/wda/apps/state`.
///
/// On the wire these are `XCUIApplicationState` bit values, but the server only
/// ever reports one of them, so they are exposed as a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AppRunState {
    /// Code 1.
    NotRunning,
    /// Code 2.
    RunningBackground,
    /// Code 4.
    RunningForeground,
}

impl AppRunState {
    pub fn code(self) -> i64 {
        match self {
            AppRunState::NotRunning => 1,
            AppRunState::RunningBackground => 2,
            AppRunState::RunningForeground => 4,
        }
    }

    pub fn is_running(self) -> bool {
        !matches!(self, AppRunState::NotRunning)
    }
}

impl TryFrom<i64> for AppRunState {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(AppRunState::NotRunning),
            2 => Ok(AppRunState::RunningBackground),
            4 => Ok(AppRunState::RunningForeground),
            other => Err(format!("unknown app state code: {other}")),
        }
    }
}

impl From<AppRunState> for i64 {
    fn from(state: AppRunState) -> Self {
        state.code()
    }
}

impl fmt::Display for AppRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AppRunState::NotRunning => "Not Running",
            AppRunState::RunningBackground => "Running (Back)",
            AppRunState::RunningForeground => "Running (Front)",
        };
        f.write_str(text)
    }
}

/// One entry of `/wda/apps/list`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppBaseInfo {
    pub pid: i64,
    pub bundle_id: String,
    #[serde(skip)]
    raw: String,
}

/// Launch arguments and environment of the active app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessArguments {
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Descriptor from `/wda/activeAppInfo`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAppInfo {
    #[serde(default)]
    pub pid: i64,
    #[serde(default)]
    pub bundle_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub process_arguments: ProcessArguments,
    #[serde(skip)]
    raw: String,
}

retains_raw!(
    SessionInfo,
    DeviceInfo,
    BatteryInfo,
    Size,
    Screen,
    AppBaseInfo,
    ActiveAppInfo,
);
