//! Error type shared by every WDA client operation.

use thiserror::Error;

/// Errors that can occur while talking to a WebDriverAgent session.
///
/// Every session call returns either its typed result or exactly one of these
/// variants. Nothing is retried and no partial state is reported: an `Err`
/// means the requested query or state change must be treated as not having
/// happened.
#[derive(Error, Debug)]
pub enum WdaError {
    /// The HTTP request never produced a response (connect, DNS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the transport's configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server replied with a well-formed envelope that reports a failure.
    #[error("server error: {error}: {message}")]
    Server {
        /// Short error kind reported by WDA (e.g. `"unknown command"`).
        error: String,
        /// Human readable detail, possibly empty.
        message: String,
    },

    /// The response payload did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A locator or session query returned an empty or absent result.
    #[error("no such element")]
    NoSuchElement,

    /// A local file could not be opened or read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl WdaError {
    /// Returns `true` if the server reported that no element matched.
    pub fn is_no_such_element(&self) -> bool {
        match self {
            WdaError::NoSuchElement => true,
            WdaError::Server { error, .. } => error == "no such element",
            _ => false,
        }
    }
}

impl From<serde_json::Error> for WdaError {
    fn from(err: serde_json::Error) -> Self {
        WdaError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for WdaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WdaError::Timeout
        } else {
            WdaError::Transport(err.to_string())
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WdaError>;
