//! # wdakit-core
//!
//! Async client for the WebDriverAgent (WDA) HTTP protocol used to drive iOS
//! devices and simulators.
//!
//! WDA does the real work on the device (UI tree traversal, gesture
//! synthesis, app lifecycle). This crate builds request bodies, sends them to
//! a running WDA session, and decodes the replies into typed values.
//!
//! ## Modules
//!
//! - [`session`] - One async method per WDA endpoint for a live session
//! - [`element`] - Locators and element handles returned by find calls
//! - [`types`] - Typed device, battery, screen, and app snapshots
//! - [`shared`] - `/source` options and helpers that work on any base URL
//! - [`body`] - Ordered JSON request body builder
//! - [`response`] - The `{value, sessionId}` envelope and server error detection
//! - [`transport`] - The HTTP seam ([`Transport`](transport::Transport) trait and a `reqwest` implementation)
//! - [`config`] - Persistent settings in `~/.wdakit/config.json`
//! - [`error`] - The [`WdaError`] taxonomy
//!
//! ## Example
//!
//! ```no_run
//! use wdakit_core::element::Locator;
//! use wdakit_core::session::Session;
//!
//! # async fn example() -> Result<(), wdakit_core::WdaError> {
//! let session = Session::new("http://localhost:8100/session/8BF16568")?;
//!
//! let size = session.window_size().await?;
//! session.tap(size.width / 2, size.height / 2).await?;
//!
//! match session.find_elements(&Locator::class_name("XCUIElementTypeButton")).await {
//!     Ok(buttons) => println!("{} buttons", buttons.len()),
//!     Err(e) if e.is_no_such_element() => println!("no buttons"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod element;
pub mod error;
pub mod response;
pub mod session;
pub mod shared;
pub mod transport;
pub mod types;

pub use error::{Result, WdaError};
pub use session::Session;
