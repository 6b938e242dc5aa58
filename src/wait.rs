//! Bounded polling
//!
//! Every wait in a session goes through [`wait_until`]: check a predicate,
//! sleep for the poll interval, give up once the deadline passes. Errors from
//! the predicate count as "not yet" so a page that is mid-navigation does not
//! abort the wait.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use std::time::{Duration, Instant};

/// Poll `predicate` every `interval` until it returns `Ok(true)` or `timeout` elapses.
pub fn wait_until<F>(condition: &str, timeout: Duration, interval: Duration, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        match predicate() {
            Ok(true) => {
                log::debug!("'{}' satisfied after {:?}", condition, started.elapsed());
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => log::debug!("Predicate for '{}' failed, retrying: {}", condition, e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(BrowserError::Timeout { condition: condition.to_string(), elapsed: started.elapsed() });
        }

        std::thread::sleep(interval.min(deadline - now));
    }
}

/// Wait for an element matching `selector` to exist
pub fn wait_for_selector<P: Page + ?Sized>(page: &P, selector: &str, timeout: Duration, interval: Duration) -> Result<()> {
    wait_until(selector, timeout, interval, || page.exists(selector))
}

/// Wait for every element matching `selector` to disappear
pub fn wait_for_absence<P: Page + ?Sized>(page: &P, selector: &str, timeout: Duration, interval: Duration) -> Result<()> {
    let condition = format!("absence of {}", selector);
    wait_until(&condition, timeout, interval, || page.exists(selector).map(|present| !present))
}

/// Wait for the page URL to differ from `from`
pub fn wait_for_url_change<P: Page + ?Sized>(page: &P, from: &str, timeout: Duration, interval: Duration) -> Result<()> {
    let condition = format!("URL to change from {}", from);
    wait_until(&condition, timeout, interval, || page.current_url().map(|url| url != from))
}

/// Wait for `document.readyState` to reach "complete"
pub fn wait_for_ready_state<P: Page + ?Sized>(page: &P, timeout: Duration, interval: Duration) -> Result<()> {
    wait_until("document.readyState == complete", timeout, interval, || {
        let state = page.evaluate("document.readyState")?;
        Ok(state.as_str() == Some("complete"))
    })
}
