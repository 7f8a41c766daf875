//! Browser error types.

use thiserror::Error;

use crate::engine::Engine;

/// Errors that can occur while launching or driving a browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("engine '{0}' cannot be driven over CDP (only chrome and msedge are supported)")]
    UnsupportedEngine(Engine),

    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("JavaScript evaluation failed: {0}")]
    JsEvalFailed(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("browser close failed: {0}")]
    CloseFailed(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Cdp(err.to_string())
    }
}
