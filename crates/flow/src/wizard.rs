//! The booking wizard: one linear pass over the site's multi-step form.
//!
//! `start → (optional login) → register → branch → next → date → time →
//! confirm-options → check-terms → confirm-booking → done`. A challenge
//! check runs before every step. Every failure is fatal; the caller
//! releases the session.

use {
    chromiumoxide::Page,
    chrono::{DateTime, Duration as ChronoDuration, Utc},
    tokio::time::{Duration, sleep},
    tracing::info,
};

use {
    crate::{branch::site_label, challenge, error::FlowError, login, login::LineCredentials},
    slotgrab_browser::{
        BrowserError, Target,
        page::{click, set_checked, wait_visible},
    },
};

/// Fixed step timeouts.
const REGISTER_TIMEOUT_TEST: Duration = Duration::from_secs(10);
const BRANCH_TIMEOUT: Duration = Duration::from_secs(5);
const NEXT_TIMEOUT_TEST: Duration = Duration::from_secs(5);
const NEXT_TIMEOUT_REAL: Duration = Duration::from_secs(10);
const DATE_TIMEOUT: Duration = Duration::from_secs(5);
const TIME_TIMEOUT: Duration = Duration::from_secs(5);
const CONFIRM_OPTIONS_TIMEOUT: Duration = Duration::from_secs(5);
const CHECKBOX_TIMEOUT: Duration = Duration::from_secs(5);
const CONFIRM_BOOKING_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds on the dynamic register-step timeout in real mode.
const REGISTER_FLOOR: Duration = Duration::from_secs(5);
const REGISTER_CEILING: Duration = Duration::from_secs(600);
/// Slack past the scheduled booking-opening time.
const REGISTER_GRACE: ChronoDuration = ChronoDuration::minutes(5);

/// Per-run booking parameters. Not persisted anywhere.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Caller-facing branch label (corrected via [`site_label`]).
    pub branch: String,
    /// Day-cell text on the calendar grid.
    pub date: String,
    /// Time-slot button text.
    pub time: String,
    /// LINE credentials; login runs only when present and not in test mode.
    pub credentials: Option<LineCredentials>,
    pub test_mode: bool,
    /// Stub site to drive in test mode.
    pub test_site_url: Option<String>,
    /// When the booking opens; sizes the register-step wait in real mode.
    pub target_booking_time: Option<DateTime<Utc>>,
}

/// Environment for a run, derived from server config.
#[derive(Debug, Clone)]
pub struct WizardOptions {
    /// Booking site URL used outside test mode.
    pub production_url: String,
    /// Fixed delay after each page action.
    pub slow_mo_ms: u64,
}

/// Register-step wait: fixed in test mode; in real mode, wait until
/// shortly past the scheduled opening time, clamped to [5s, 600s].
pub fn register_timeout(
    test_mode: bool,
    target_booking_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Duration, FlowError> {
    if test_mode {
        return Ok(REGISTER_TIMEOUT_TEST);
    }

    let target = target_booking_time.ok_or_else(|| {
        FlowError::InvalidConfig("targetBookingTime is required outside test mode".into())
    })?;

    let window_ms = (target + REGISTER_GRACE - now).num_milliseconds();
    let clamped = window_ms.clamp(
        REGISTER_FLOOR.as_millis() as i64,
        REGISTER_CEILING.as_millis() as i64,
    );
    Ok(Duration::from_millis(clamped as u64))
}

/// URL the run starts from.
fn target_url<'a>(cfg: &'a BookingConfig, opts: &'a WizardOptions) -> Result<&'a str, FlowError> {
    if cfg.test_mode {
        cfg.test_site_url
            .as_deref()
            .ok_or_else(|| FlowError::InvalidConfig("testSiteUrl is required in test mode".into()))
    } else {
        Ok(opts.production_url.as_str())
    }
}

/// Run the whole booking flow for one session.
pub async fn run(
    page: &Page,
    session_id: &str,
    cfg: &BookingConfig,
    opts: &WizardOptions,
) -> Result<(), FlowError> {
    let target_url = target_url(cfg, opts)?;

    info!(
        session_id,
        url = target_url,
        test_mode = cfg.test_mode,
        "navigating to booking site"
    );
    page.goto(target_url)
        .await
        .map_err(|e| FlowError::Browser(BrowserError::NavigationFailed(e.to_string())))?;
    let _ = page.wait_for_navigation().await;

    match (&cfg.credentials, cfg.test_mode) {
        (Some(creds), false) => {
            login::connect_line_account(page, session_id, creds, &opts.production_url).await?;
        },
        (_, true) => info!(session_id, "test mode, skipping LINE login"),
        (None, false) => info!(session_id, "no LINE credentials, skipping LINE login"),
    }

    let slow_mo = Duration::from_millis(opts.slow_mo_ms);
    let register_wait = register_timeout(cfg.test_mode, cfg.target_booking_time, Utc::now())?;

    click_step(
        page,
        session_id,
        cfg.test_mode,
        "register",
        Target::button("Register"),
        register_wait,
        slow_mo,
    )
    .await?;

    let branch_label = site_label(&cfg.branch);
    click_step(
        page,
        session_id,
        cfg.test_mode,
        "branch-select",
        Target::button(branch_label),
        BRANCH_TIMEOUT,
        slow_mo,
    )
    .await?;

    let next_timeout = if cfg.test_mode {
        NEXT_TIMEOUT_TEST
    } else {
        NEXT_TIMEOUT_REAL
    };
    click_step(
        page,
        session_id,
        cfg.test_mode,
        "next",
        Target::button("Next"),
        next_timeout,
        slow_mo,
    )
    .await?;

    click_step(
        page,
        session_id,
        cfg.test_mode,
        "date-select",
        Target::with_text("div#calendar-grid button.day-cell", cfg.date.clone()),
        DATE_TIMEOUT,
        slow_mo,
    )
    .await?;

    click_step(
        page,
        session_id,
        cfg.test_mode,
        "time-select",
        Target::with_text("div.button-grid button", cfg.time.clone()),
        TIME_TIMEOUT,
        slow_mo,
    )
    .await?;

    click_step(
        page,
        session_id,
        cfg.test_mode,
        "confirm-options",
        Target::with_text("button.primary", "Confirm"),
        CONFIRM_OPTIONS_TIMEOUT,
        slow_mo,
    )
    .await?;

    // Terms checkbox: check rather than click, so a pre-checked box stays on.
    {
        const STEP: &str = "check-terms";
        let target = Target::css("input#final-checkbox");
        challenge::resolve_pending(page, session_id, cfg.test_mode).await?;
        info!(session_id, step = STEP, %target, "waiting for control");
        wait_visible(page, &target, CHECKBOX_TIMEOUT)
            .await
            .map_err(FlowError::step(STEP))?;
        set_checked(page, &target)
            .await
            .map_err(FlowError::step(STEP))?;
        sleep(slow_mo).await;
    }

    click_step(
        page,
        session_id,
        cfg.test_mode,
        "confirm-booking",
        Target::with_text("button.primary", "Confirm Booking"),
        CONFIRM_BOOKING_TIMEOUT,
        slow_mo,
    )
    .await?;

    info!(session_id, "booking flow completed");
    Ok(())
}

/// One wizard transition: challenge check, bounded wait, click.
async fn click_step(
    page: &Page,
    session_id: &str,
    test_mode: bool,
    step: &'static str,
    target: Target,
    timeout: Duration,
    slow_mo: Duration,
) -> Result<(), FlowError> {
    challenge::resolve_pending(page, session_id, test_mode).await?;

    info!(
        session_id,
        step,
        %target,
        timeout_ms = timeout.as_millis() as u64,
        "waiting for control"
    );
    wait_visible(page, &target, timeout)
        .await
        .map_err(FlowError::step(step))?;
    click(page, &target).await.map_err(FlowError::step(step))?;
    sleep(slow_mo).await;

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-08-23T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_mode_register_timeout_is_fixed() {
        assert_eq!(
            register_timeout(true, None, now()).unwrap(),
            Duration::from_secs(10)
        );
        // A target time is ignored in test mode.
        assert_eq!(
            register_timeout(true, Some(now()), now()).unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn real_mode_requires_a_target_time() {
        assert!(matches!(
            register_timeout(false, None, now()),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn near_future_target_clamps_to_the_ceiling() {
        // target = now + 2min, so the window is 7min, clamped to 600s.
        let target = now() + ChronoDuration::minutes(2);
        assert_eq!(
            register_timeout(false, Some(target), now()).unwrap(),
            Duration::from_millis(600_000)
        );
    }

    #[test]
    fn past_target_clamps_to_the_floor() {
        let target = now() - ChronoDuration::hours(1);
        assert_eq!(
            register_timeout(false, Some(target), now()).unwrap(),
            Duration::from_millis(5_000)
        );
    }

    #[test]
    fn open_window_uses_the_remaining_time() {
        // A target 3min in the past leaves a 2min window, inside the clamp.
        let target = now() - ChronoDuration::minutes(3);
        assert_eq!(
            register_timeout(false, Some(target), now()).unwrap(),
            Duration::from_millis(120_000)
        );
    }

    fn base_config(test_mode: bool) -> BookingConfig {
        BookingConfig {
            branch: "Terminal 21".into(),
            date: "12".into(),
            time: "10:00".into(),
            credentials: None,
            test_mode,
            test_site_url: None,
            target_booking_time: None,
        }
    }

    fn opts() -> WizardOptions {
        WizardOptions {
            production_url: "https://booking.example/".into(),
            slow_mo_ms: 0,
        }
    }

    #[test]
    fn test_mode_requires_a_test_site_url() {
        assert!(matches!(
            target_url(&base_config(true), &opts()),
            Err(FlowError::InvalidConfig(_))
        ));

        let mut cfg = base_config(true);
        cfg.test_site_url = Some("http://localhost:3000".into());
        assert_eq!(target_url(&cfg, &opts()).unwrap(), "http://localhost:3000");
    }

    #[test]
    fn real_mode_uses_the_production_url() {
        let cfg = base_config(false);
        assert_eq!(target_url(&cfg, &opts()).unwrap(), "https://booking.example/");
    }
}
