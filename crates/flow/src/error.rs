//! Flow error types.

use {slotgrab_browser::BrowserError, thiserror::Error};

/// Errors that abort a booking run. All of them are fatal: the caller
/// releases the session and reports the failure.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid booking config: {0}")]
    InvalidConfig(String),

    #[error(
        "challenge '{challenge}' was not solved within {timeout_ms}ms, manual intervention required"
    )]
    ChallengeUnresolved {
        challenge: &'static str,
        timeout_ms: u64,
    },

    #[error("step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: BrowserError,
    },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl FlowError {
    pub(crate) fn step(step: &'static str) -> impl FnOnce(BrowserError) -> FlowError {
        move |source| FlowError::Step { step, source }
    }
}
