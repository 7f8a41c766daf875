//! Page-level locate/wait/act primitives.
//!
//! Elements are found by evaluating JavaScript in the page (visibility is
//! judged from layout and computed style), then acted on with CDP input
//! events dispatched at the element centre. Waits are 100ms poll loops
//! bounded by a caller-supplied timeout.

use std::fmt;

use {
    chromiumoxide::{
        Page,
        cdp::browser_protocol::input::{
            DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
            DispatchMouseEventType, MouseButton,
        },
    },
    serde::Deserialize,
    tokio::time::{Duration, Instant, sleep},
    tracing::debug,
};

use crate::error::BrowserError;

/// Poll interval for visibility and URL waits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settle delay between scrolling an element into view and clicking it.
const SCROLL_SETTLE: Duration = Duration::from_millis(100);

/// How to find a control on the page.
///
/// Text matching is containment on `innerText`; a bare text target
/// resolves to the smallest matching element so a fragment does not just
/// match `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A plain CSS selector.
    Css(String),
    /// The smallest visible element whose text contains the fragment.
    Text(String),
    /// Elements matching a CSS selector, filtered by text containment.
    WithText { css: String, text: String },
}

impl Target {
    pub fn css(selector: impl Into<String>) -> Self {
        Target::Css(selector.into())
    }

    pub fn text(fragment: impl Into<String>) -> Self {
        Target::Text(fragment.into())
    }

    pub fn with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Target::WithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// A `button` element containing the given text.
    pub fn button(text: impl Into<String>) -> Self {
        Target::with_text("button", text)
    }

    /// JS expression evaluating to the first visible matching element, or
    /// `null`. Meant to be spliced into the probe/centre wrappers below.
    fn finder_js(&self) -> String {
        const VISIBLE: &str = "const visible = el => { const r = el.getBoundingClientRect(); \
             const s = window.getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; };";

        match self {
            Target::Css(selector) => {
                let sel = js_string(selector);
                format!(
                    "{VISIBLE}
                     const el = Array.from(document.querySelectorAll({sel})).find(visible) || null;"
                )
            },
            Target::Text(fragment) => {
                let frag = js_string(fragment);
                format!(
                    "{VISIBLE}
                     const hits = Array.from(document.querySelectorAll('body *'))
                         .filter(e => (e.innerText || '').includes({frag}));
                     const el = hits.find(e => visible(e) && !hits.some(o => o !== e && e.contains(o))) || null;"
                )
            },
            Target::WithText { css, text } => {
                let sel = js_string(css);
                let frag = js_string(text);
                format!(
                    "{VISIBLE}
                     const el = Array.from(document.querySelectorAll({sel}))
                         .find(e => (e.innerText || '').includes({frag}) && visible(e)) || null;"
                )
            },
        }
    }

    /// JS expression returning `true` when a matching element is visible.
    fn probe_js(&self) -> String {
        format!("(() => {{ {} return el !== null; }})()", self.finder_js())
    }

    /// JS expression that scrolls the first match into view and returns its
    /// centre as a JSON string, or an empty string when absent.
    fn center_js(&self) -> String {
        format!(
            "(() => {{ {}
                 if (!el) return '';
                 el.scrollIntoView({{block: 'center', inline: 'center'}});
                 const r = el.getBoundingClientRect();
                 return JSON.stringify({{x: r.x + r.width / 2, y: r.y + r.height / 2}});
             }})()",
            self.finder_js()
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Css(selector) => write!(f, "css `{selector}`"),
            Target::Text(fragment) => write!(f, "text \"{fragment}\""),
            Target::WithText { css, text } => write!(f, "css `{css}` with text \"{text}\""),
        }
    }
}

/// Escape a string into a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Viewport-coordinate centre of a located element.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementPoint {
    pub x: f64,
    pub y: f64,
}

async fn eval_bool(page: &Page, js: &str) -> Result<bool, BrowserError> {
    Ok(page
        .evaluate(js)
        .await
        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?
        .into_value()
        .unwrap_or(false))
}

/// Locate the first visible match, scrolling it into view.
pub async fn locate(page: &Page, target: &Target) -> Result<Option<ElementPoint>, BrowserError> {
    let raw: String = page
        .evaluate(target.center_js().as_str())
        .await
        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?
        .into_value()
        .unwrap_or_default();

    if raw.is_empty() {
        return Ok(None);
    }
    let point = serde_json::from_str(&raw)
        .map_err(|e| BrowserError::JsEvalFailed(format!("bad locator result: {e}")))?;
    Ok(Some(point))
}

/// Probe for visibility within a short grace window.
///
/// Evaluation failures count as "not visible" so a probe against a page
/// that is mid-navigation does not abort the run.
pub async fn is_visible(page: &Page, target: &Target, grace: Duration) -> Result<bool, BrowserError> {
    let deadline = Instant::now() + grace;
    loop {
        if eval_bool(page, target.probe_js().as_str())
            .await
            .unwrap_or(false)
        {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait for a matching element to become visible.
pub async fn wait_visible(
    page: &Page,
    target: &Target,
    timeout: Duration,
) -> Result<(), BrowserError> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if eval_bool(page, target.probe_js().as_str()).await? {
            debug!(%target, "element visible");
            return Ok(());
        }
        sleep(POLL_INTERVAL).await;
    }

    Err(BrowserError::Timeout {
        what: target.to_string(),
        timeout_ms: timeout.as_millis() as u64,
    })
}

/// Wait for every match to become hidden or detached.
pub async fn wait_hidden(
    page: &Page,
    target: &Target,
    timeout: Duration,
) -> Result<(), BrowserError> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !eval_bool(page, target.probe_js().as_str()).await? {
            debug!(%target, "element hidden");
            return Ok(());
        }
        sleep(POLL_INTERVAL).await;
    }

    Err(BrowserError::Timeout {
        what: format!("{target} to disappear"),
        timeout_ms: timeout.as_millis() as u64,
    })
}

/// Wait for the page URL to start with the given prefix.
pub async fn wait_for_url_prefix(
    page: &Page,
    prefix: &str,
    timeout: Duration,
) -> Result<(), BrowserError> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let url = page
            .url()
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?
            .unwrap_or_default();
        if url.starts_with(prefix) {
            debug!(url, "reached URL");
            return Ok(());
        }
        sleep(POLL_INTERVAL).await;
    }

    Err(BrowserError::Timeout {
        what: format!("navigation to {prefix}"),
        timeout_ms: timeout.as_millis() as u64,
    })
}

/// Click the first visible match with CDP mouse events at its centre.
pub async fn click(page: &Page, target: &Target) -> Result<(), BrowserError> {
    // First locate scrolls the element into view.
    if locate(page, target).await?.is_none() {
        return Err(BrowserError::ElementNotFound(target.to_string()));
    }
    sleep(SCROLL_SETTLE).await;

    // Re-locate for post-scroll coordinates.
    let point = locate(page, target)
        .await?
        .ok_or_else(|| BrowserError::ElementNotFound(target.to_string()))?;

    dispatch_click(page, point).await?;
    debug!(%target, x = point.x, y = point.y, "clicked element");
    Ok(())
}

async fn dispatch_click(page: &Page, point: ElementPoint) -> Result<(), BrowserError> {
    let press = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MousePressed)
        .x(point.x)
        .y(point.y)
        .button(MouseButton::Left)
        .click_count(1)
        .build()
        .map_err(|e| BrowserError::Cdp(e.to_string()))?;
    page.execute(press)
        .await
        .map_err(|e| BrowserError::Cdp(e.to_string()))?;

    let release = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MouseReleased)
        .x(point.x)
        .y(point.y)
        .button(MouseButton::Left)
        .click_count(1)
        .build()
        .map_err(|e| BrowserError::Cdp(e.to_string()))?;
    page.execute(release)
        .await
        .map_err(|e| BrowserError::Cdp(e.to_string()))?;

    Ok(())
}

/// Focus the first visible match, clear its value, and type text into it
/// with CDP key events.
pub async fn type_text(page: &Page, target: &Target, text: &str) -> Result<(), BrowserError> {
    let focus_js = format!(
        "(() => {{ {}
             if (!el) return false;
             el.focus();
             if ('value' in el) el.value = '';
             return true;
         }})()",
        target.finder_js()
    );
    if !eval_bool(page, focus_js.as_str()).await? {
        return Err(BrowserError::ElementNotFound(target.to_string()));
    }

    for c in text.chars() {
        let key_down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .text(c.to_string())
            .build()
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;
        page.execute(key_down)
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;

        let key_up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .text(c.to_string())
            .build()
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;
        page.execute(key_up)
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;
    }

    debug!(%target, chars = text.len(), "typed text");
    Ok(())
}

/// Ensure a checkbox-like element is checked, clicking it when it is not.
pub async fn set_checked(page: &Page, target: &Target) -> Result<(), BrowserError> {
    let state_js = format!(
        "(() => {{ {}
             if (!el) return 'missing';
             return el.checked ? 'checked' : 'unchecked';
         }})()",
        target.finder_js()
    );
    let state: String = page
        .evaluate(state_js.as_str())
        .await
        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?
        .into_value()
        .unwrap_or_default();

    match state.as_str() {
        "checked" => Ok(()),
        "unchecked" => click(page, target).await,
        _ => Err(BrowserError::ElementNotFound(target.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_target_display() {
        let t = Target::button("Register");
        assert_eq!(t.to_string(), "css `button` with text \"Register\"");
    }

    #[test]
    fn finder_js_escapes_quotes() {
        let t = Target::text(r#"Let's confirm you are "human""#);
        let js = t.probe_js();
        assert!(js.contains(r#"\"human\""#));
        // The apostrophe must survive as-is inside a double-quoted literal.
        assert!(js.contains("Let's"));
    }

    #[test]
    fn css_target_is_spliced_as_json_literal() {
        let t = Target::css("div#calendar-grid button.day-cell");
        assert!(
            t.center_js()
                .contains("\"div#calendar-grid button.day-cell\"")
        );
    }

    #[test]
    fn with_text_finder_contains_both_parts() {
        let t = Target::with_text("button.primary", "Confirm Booking");
        let js = t.probe_js();
        assert!(js.contains("\"button.primary\""));
        assert!(js.contains("\"Confirm Booking\""));
    }
}
