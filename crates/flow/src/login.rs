//! LINE account connection sub-flow.
//!
//! The booking site delegates identity to LINE. When the account is not
//! yet connected the site shows a "Connect" entry point; driving it leads
//! to the LINE login page and, after submitting credentials, a redirect
//! back to the booking site. LINE may additionally demand confirmation on
//! the user's phone, which is why the final redirect wait is long.

use {
    chromiumoxide::Page,
    secrecy::{ExposeSecret, Secret},
    tokio::time::Duration,
    tracing::info,
};

use {
    crate::error::FlowError,
    slotgrab_browser::{
        Target,
        page::{click, is_visible, type_text, wait_for_url_prefix, wait_visible},
    },
};

const CONNECT_PROBE: Duration = Duration::from_secs(5);
const CONNECT_ACCOUNT_TIMEOUT: Duration = Duration::from_secs(10);
const LINE_LOGIN_PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const REDIRECT_BACK_TIMEOUT: Duration = Duration::from_secs(120);

const LINE_LOGIN_URL_PREFIX: &str = "https://access.line.me/oauth2/v2.1/login";

/// LINE credentials for the login sub-flow.
#[derive(Debug, Clone)]
pub struct LineCredentials {
    pub email: String,
    pub password: Secret<String>,
}

fn connect_button() -> Target {
    Target::with_text("button.sc-48e8cede-5", "Connect")
}

fn connect_line_account_button() -> Target {
    Target::with_text("button.sc-48e8cede-5", "Connect LINE Account*")
}

/// Connect the LINE account if the site asks for it.
///
/// When the "Connect" entry point is not visible the account is treated
/// as already connected and nothing happens. Any wait timeout in here is
/// fatal to the run.
pub async fn connect_line_account(
    page: &Page,
    session_id: &str,
    creds: &LineCredentials,
    host_url: &str,
) -> Result<(), FlowError> {
    info!(session_id, "checking LINE connection status");

    if !is_visible(page, &connect_button(), CONNECT_PROBE).await? {
        info!(
            session_id,
            "no connect entry point, assuming LINE account is already connected"
        );
        return Ok(());
    }

    info!(session_id, "connect entry point found, clicking");
    click(page, &connect_button())
        .await
        .map_err(FlowError::step("line-connect"))?;

    wait_visible(page, &connect_line_account_button(), CONNECT_ACCOUNT_TIMEOUT)
        .await
        .map_err(FlowError::step("line-connect-account"))?;
    click(page, &connect_line_account_button())
        .await
        .map_err(FlowError::step("line-connect-account"))?;

    info!(session_id, "waiting for LINE login page");
    wait_for_url_prefix(page, LINE_LOGIN_URL_PREFIX, LINE_LOGIN_PAGE_TIMEOUT)
        .await
        .map_err(FlowError::step("line-login-page"))?;

    info!(session_id, "filling LINE credentials");
    type_text(
        page,
        &Target::css(r#"input[name="tid"][placeholder="Email address"]"#),
        &creds.email,
    )
    .await
    .map_err(FlowError::step("line-email"))?;
    type_text(
        page,
        &Target::css(r#"input[name="tpasswd"][placeholder="Password"]"#),
        creds.password.expose_secret(),
    )
    .await
    .map_err(FlowError::step("line-password"))?;

    click(
        page,
        &Target::with_text(r#"button.MdBtn01[type="submit"]"#, "Log in"),
    )
    .await
    .map_err(FlowError::step("line-submit"))?;

    info!(
        session_id,
        ">>> confirm on your mobile device if LINE requires it <<<"
    );
    wait_for_url_prefix(page, host_url, REDIRECT_BACK_TIMEOUT)
        .await
        .map_err(FlowError::step("line-redirect-back"))?;

    info!(session_id, "redirected back to booking site after LINE login");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_password() {
        let creds = LineCredentials {
            email: "user@example.com".into(),
            password: Secret::new("hunter2".into()),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn connect_targets_use_the_site_button_class() {
        assert_eq!(
            connect_button(),
            Target::with_text("button.sc-48e8cede-5", "Connect")
        );
        assert_eq!(
            connect_line_account_button(),
            Target::with_text("button.sc-48e8cede-5", "Connect LINE Account*")
        );
    }
}
