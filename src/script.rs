//! Running caller-supplied JavaScript and following the navigation it causes

use crate::config::Timeouts;
use crate::page::Page;
use crate::stage::StageOutcome;
use crate::wait;
use std::time::Duration;

/// Evaluate `script` in the page, then optionally wait out a navigation it triggers
///
/// Nothing here is fatal: a throwing script, a navigation that never happens
/// and a page that never finishes loading all come back as warnings.
pub fn run_script<P: Page + ?Sized>(
    page: &P,
    script: &str,
    wait_for_navigation: Option<Duration>,
    timeouts: &Timeouts,
) -> StageOutcome {
    let mut warnings = Vec::new();

    if let Err(e) = page.evaluate(script) {
        warnings.push(format!("JavaScript execution failed: {}", e));
    }

    if let Some(timeout) = wait_for_navigation {
        warnings.extend(wait_for_script_navigation(page, timeout, timeouts));
    }

    StageOutcome::from_warnings(warnings)
}

fn wait_for_script_navigation<P: Page + ?Sized>(page: &P, timeout: Duration, timeouts: &Timeouts) -> Vec<String> {
    let mut warnings = Vec::new();

    match page.current_url() {
        Ok(before) => {
            log::info!("Waiting up to {:?} for navigation away from {}", timeout, before);
            match wait::wait_for_url_change(page, &before, timeout, timeouts.poll_interval) {
                Ok(()) => log::info!("Navigation detected"),
                Err(e) => warnings.push(format!("No navigation after script: {}", e)),
            }
        }
        Err(e) => warnings.push(format!("Could not read URL after script: {}", e)),
    }

    // Checked even when no URL change was seen, the script may have reloaded in place
    if let Err(e) = wait::wait_for_ready_state(page, timeouts.script_ready, timeouts.poll_interval) {
        warnings.push(format!("Page did not finish loading after script: {}", e));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fake::{Call, FakePage};
    use serde_json::json;

    fn quick() -> Timeouts {
        Timeouts {
            script_ready: Duration::from_millis(20),
            poll_interval: Duration::from_millis(1),
            ..Timeouts::default()
        }
    }

    const WAIT: Option<Duration> = Some(Duration::from_millis(20));

    #[test]
    fn test_script_runs_once() {
        let page = FakePage::new();
        let outcome = run_script(&page, "document.title = 'x'", None, &quick());
        assert!(outcome.is_ok());
        assert_eq!(page.calls(), [Call::Evaluate("document.title = 'x'".to_string())]);
    }

    #[test]
    fn test_failing_script_is_a_warning() {
        let page = FakePage::new().failing_script("throw 1");
        match run_script(&page, "throw 1", None, &quick()) {
            StageOutcome::Warnings(w) => assert!(w[0].starts_with("JavaScript execution failed")),
            other => panic!("Expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn test_navigation_followed() {
        let script = "location.href = '/next'";
        let page = FakePage::new().redirect_on(script, "http://x/next");
        let outcome = run_script(&page, script, WAIT, &quick());
        assert!(outcome.is_ok(), "{:?}", outcome);
        assert_eq!(page.current_url().unwrap(), "http://x/next");
    }

    #[test]
    fn test_missing_navigation_warns() {
        let page = FakePage::new();
        match run_script(&page, "1 + 1", WAIT, &quick()) {
            StageOutcome::Warnings(w) => {
                assert_eq!(w.len(), 1);
                assert!(w[0].contains("No navigation after script"));
            }
            other => panic!("Expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn test_unfinished_load_warns() {
        let script = "location.reload()";
        let page = FakePage::new()
            .redirect_on(script, "http://x/again")
            .with_eval_result("document.readyState", json!("loading"));
        match run_script(&page, script, WAIT, &quick()) {
            StageOutcome::Warnings(w) => {
                assert_eq!(w.len(), 1);
                assert!(w[0].contains("did not finish loading"));
            }
            other => panic!("Expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn test_no_wait_skips_url_polling() {
        let page = FakePage::new();
        run_script(&page, "1", None, &quick());
        assert!(!page.calls().contains(&Call::Evaluate("document.readyState".to_string())));
    }
}
