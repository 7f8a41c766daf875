//! Verification-challenge handling.
//!
//! Challenges appear at random between wizard steps. Nothing here solves
//! them: when an indicator is visible, the operator is told to solve it in
//! the browser window and the handler waits for the indicator to go away.

use {
    chromiumoxide::Page,
    tokio::time::Duration,
    tracing::{info, warn},
};

use {
    crate::error::FlowError,
    slotgrab_browser::{
        Target,
        page::{is_visible, wait_hidden},
    },
};

/// Existence probe per indicator.
const PROBE_GRACE: Duration = Duration::from_secs(1);

/// How long the operator gets to solve a challenge.
const SOLVE_TIMEOUT_TEST: Duration = Duration::from_secs(10);
const SOLVE_TIMEOUT_REAL: Duration = Duration::from_secs(300);

/// Known challenge variants, in detection order. Only the first one whose
/// indicator is visible is acted upon per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    HumanVerificationHeading,
    BedPuzzle,
    CurtainPuzzle,
    ConfirmButton,
    RecaptchaExpiredFrame,
    RecaptchaContainer,
    SiteKeyContainer,
}

impl Challenge {
    pub const ALL: [Challenge; 7] = [
        Challenge::HumanVerificationHeading,
        Challenge::BedPuzzle,
        Challenge::CurtainPuzzle,
        Challenge::ConfirmButton,
        Challenge::RecaptchaExpiredFrame,
        Challenge::RecaptchaContainer,
        Challenge::SiteKeyContainer,
    ];

    /// UI pattern that signals this challenge is on screen.
    pub fn indicator(self) -> Target {
        match self {
            Challenge::HumanVerificationHeading => Target::text("Let's confirm you are human"),
            Challenge::BedPuzzle => Target::text("Choose all the beds"),
            Challenge::CurtainPuzzle => Target::text("Choose all the curtains"),
            Challenge::ConfirmButton => Target::button("Confirm"),
            Challenge::RecaptchaExpiredFrame => {
                Target::css(r#"iframe[title="reCAPTCHA challenge expired"]"#)
            },
            Challenge::RecaptchaContainer => Target::css("div.g-recaptcha"),
            Challenge::SiteKeyContainer => Target::css("div[data-sitekey]"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Challenge::HumanVerificationHeading => "human-verification heading",
            Challenge::BedPuzzle => "bed puzzle",
            Challenge::CurtainPuzzle => "curtain puzzle",
            Challenge::ConfirmButton => "confirm button",
            Challenge::RecaptchaExpiredFrame => "recaptcha iframe",
            Challenge::RecaptchaContainer => "recaptcha container",
            Challenge::SiteKeyContainer => "sitekey container",
        }
    }
}

/// Solve window for the current mode.
pub fn solve_timeout(test_mode: bool) -> Duration {
    if test_mode {
        SOLVE_TIMEOUT_TEST
    } else {
        SOLVE_TIMEOUT_REAL
    }
}

/// Check for a pending challenge and wait for a human to clear it.
///
/// Probes each known indicator in order; the first visible one is waited
/// on until it becomes hidden. If it is still visible when the solve
/// window closes, the whole run is aborted. Returns whether a challenge
/// was found.
pub async fn resolve_pending(
    page: &Page,
    session_id: &str,
    test_mode: bool,
) -> Result<bool, FlowError> {
    for challenge in Challenge::ALL {
        let indicator = challenge.indicator();
        if !is_visible(page, &indicator, PROBE_GRACE).await? {
            continue;
        }

        let timeout = solve_timeout(test_mode);
        warn!(
            session_id,
            challenge = challenge.label(),
            indicator = %indicator,
            "challenge detected"
        );
        info!(
            session_id,
            timeout_secs = timeout.as_secs(),
            ">>> solve the challenge manually in the browser window <<<"
        );

        wait_hidden(page, &indicator, timeout)
            .await
            .map_err(|_| FlowError::ChallengeUnresolved {
                challenge: challenge.label(),
                timeout_ms: timeout.as_millis() as u64,
            })?;

        info!(
            session_id,
            challenge = challenge.label(),
            "challenge appears to be solved"
        );
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_order_starts_with_text_indicators() {
        assert_eq!(Challenge::ALL[0], Challenge::HumanVerificationHeading);
        assert_eq!(Challenge::ALL[3], Challenge::ConfirmButton);
        assert_eq!(Challenge::ALL[6], Challenge::SiteKeyContainer);
    }

    #[test]
    fn solve_timeout_depends_on_mode() {
        assert_eq!(solve_timeout(true), Duration::from_secs(10));
        assert_eq!(solve_timeout(false), Duration::from_secs(300));
    }

    #[test]
    fn indicators_cover_text_buttons_and_containers() {
        assert_eq!(
            Challenge::BedPuzzle.indicator(),
            Target::text("Choose all the beds")
        );
        assert_eq!(Challenge::ConfirmButton.indicator(), Target::button("Confirm"));
        assert_eq!(
            Challenge::RecaptchaContainer.indicator(),
            Target::css("div.g-recaptcha")
        );
    }
}
