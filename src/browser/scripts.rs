//! JavaScript injected into the page.
//!
//! Every script returns `JSON.stringify(...)` so the result survives the
//! DevTools round trip as a plain string.

use crate::errors::Result;
use serde::Deserialize;

/// Attribute used to find a located element again on the next call.
pub const HANDLE_ATTRIBUTE: &str = "data-likers-handle";

#[derive(Debug, Clone, Deserialize)]
pub struct ClickableProbe {
    pub found: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandleAction {
    pub ok: bool,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Tags the first clickable match of `xpath` with `token`.
///
/// Clickable means rendered, with a non-empty box, not disabled, and, when
/// inside the viewport, not covered by another element at its center.
pub fn locate_clickable(xpath: &str, token: &str) -> Result<String> {
    Ok(format!(
        r#"
            (function() {{
                const xpath = {xpath};
                const token = {token};
                const attr = {attr};
                let snapshot;
                try {{
                    snapshot = document.evaluate(xpath, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                }} catch (e) {{
                    return JSON.stringify({{ found: false, error: e.message }});
                }}

                for (let i = 0; i < snapshot.snapshotLength; i++) {{
                    const el = snapshot.snapshotItem(i);
                    if (!(el instanceof Element) || !el.isConnected) continue;

                    const style = window.getComputedStyle(el);
                    if (style.display === 'none' || style.visibility === 'hidden') continue;

                    const rect = el.getBoundingClientRect();
                    if (rect.width === 0 || rect.height === 0) continue;

                    if (el.disabled || el.getAttribute('aria-disabled') === 'true') continue;

                    const cx = rect.left + rect.width / 2;
                    const cy = rect.top + rect.height / 2;
                    if (cx >= 0 && cy >= 0 && cx < window.innerWidth && cy < window.innerHeight) {{
                        const hit = document.elementFromPoint(cx, cy);
                        if (hit && hit !== el && !el.contains(hit) && !hit.contains(el)) continue;
                    }}

                    el.setAttribute(attr, token);
                    return JSON.stringify({{ found: true }});
                }}

                return JSON.stringify({{ found: false }});
            }})()
        "#,
        xpath = serde_json::to_string(xpath)?,
        token = serde_json::to_string(token)?,
        attr = serde_json::to_string(HANDLE_ATTRIBUTE)?,
    ))
}

/// Runs `action` (a JS statement using `el`) on the element tagged `token`.
fn on_handle(token: &str, action: &str) -> Result<String> {
    let selector = format!("[{}=\"{}\"]", HANDLE_ATTRIBUTE, token);
    Ok(format!(
        r#"
            (function() {{
                const el = document.querySelector({selector});
                if (!el || !el.isConnected) {{
                    return JSON.stringify({{ ok: false, stale: true }});
                }}
                try {{
                    {action}
                    return JSON.stringify({{ ok: true }});
                }} catch (e) {{
                    return JSON.stringify({{ ok: false, error: e.message }});
                }}
            }})()
        "#,
        selector = serde_json::to_string(&selector)?,
        action = action,
    ))
}

pub fn scroll_into_view(token: &str) -> Result<String> {
    on_handle(token, "el.scrollIntoView({ block: 'center' });")
}

pub fn click(token: &str) -> Result<String> {
    on_handle(token, "el.click();")
}

/// Snapshots text and resolved `href` of every match of `xpath`.
pub fn collect_links(xpath: &str) -> Result<String> {
    Ok(format!(
        r#"
            (function() {{
                const xpath = {xpath};
                const snapshot = document.evaluate(xpath, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const links = [];
                for (let i = 0; i < snapshot.snapshotLength; i++) {{
                    const el = snapshot.snapshotItem(i);
                    if (!(el instanceof Element)) continue;
                    const attributes = {{}};
                    const href = typeof el.href === 'string' ? el.href : el.getAttribute('href');
                    if (href) attributes.href = href;
                    links.push({{
                        text_content: (el.innerText || el.textContent || '').trim(),
                        attributes: attributes
                    }});
                }}
                return JSON.stringify(links);
            }})()
        "#,
        xpath = serde_json::to_string(xpath)?,
    ))
}

pub const READY_STATE: &str = r#"
    (function() {
        return JSON.stringify({ readyState: document.readyState, url: window.location.href });
    })()
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_quotes_are_escaped() {
        let script = locate_clickable(r#"//a[@title="See \"more\""]"#, "t-1").unwrap();
        assert!(script.contains(r#"const xpath = "//a[@title=\"See \\\"more\\\"\"]";"#));
        assert!(script.contains(r#"const token = "t-1";"#));
    }

    #[test]
    fn handle_scripts_target_the_token() {
        let script = click("abc").unwrap();
        assert!(script.contains(r#"document.querySelector("[data-likers-handle=\"abc\"]")"#));
        assert!(script.contains("el.click();"));
    }

    #[test]
    fn probe_decodes_without_error_field() {
        let probe: ClickableProbe = serde_json::from_str(r#"{"found":true}"#).unwrap();
        assert!(probe.found);
        assert!(probe.error.is_none());
    }

    #[test]
    fn stale_action_decodes() {
        let action: HandleAction = serde_json::from_str(r#"{"ok":false,"stale":true}"#).unwrap();
        assert!(!action.ok && action.stale);
    }
}
