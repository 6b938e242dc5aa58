//! Phoenix LiveView detection
//!
//! LiveView pages carry a `data-phx-session` attribute on their root and add
//! `phx-connected` once the websocket is up. Forms are submitted over that
//! socket, and `phx-submit-loading` / `phx-change-loading` mark the elements
//! still waiting on the server.

use crate::config::Timeouts;
use crate::page::Page;
use crate::stage::StageOutcome;
use crate::wait;

/// Attribute present on every LiveView root element
pub const SESSION_MARKER: &str = "[data-phx-session]";

/// Class added once the LiveView socket has joined
pub const CONNECTED_MARKER: &str = ".phx-connected";

/// Class present while a submit event is in flight
pub const SUBMIT_LOADING_MARKER: &str = ".phx-submit-loading";

/// Class present while a change event is in flight
pub const CHANGE_LOADING_MARKER: &str = ".phx-change-loading";

/// Result of inspecting a freshly loaded page
#[derive(Debug)]
pub struct Detection {
    /// The page is a LiveView and form submission must go through it
    pub active: bool,
    pub outcome: StageOutcome,
}

/// Look for LiveView markers and, when found, wait for the socket to connect
///
/// A connection that never shows up only produces a warning; the page is
/// still treated as a LiveView.
pub fn detect<P: Page + ?Sized>(page: &P, timeouts: &Timeouts) -> Detection {
    let active = match page.exists(SESSION_MARKER) {
        Ok(found) => found,
        Err(e) => {
            log::debug!("LiveView detection failed, assuming a plain page: {}", e);
            false
        }
    };

    if !active {
        return Detection { active, outcome: StageOutcome::Ok };
    }

    log::info!("Detected Phoenix LiveView page, waiting for connection...");
    let outcome = match wait::wait_for_selector(page, CONNECTED_MARKER, timeouts.framework_connect, timeouts.poll_interval)
    {
        Ok(()) => {
            log::info!("Phoenix LiveView connected");
            StageOutcome::Ok
        }
        Err(e) => StageOutcome::warning(format!("Could not detect LiveView connection: {}", e)),
    };

    Detection { active, outcome }
}

/// Wait for both LiveView loading markers to clear after a submit
pub fn wait_for_idle<P: Page + ?Sized>(page: &P, timeouts: &Timeouts) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = wait::wait_for_absence(page, SUBMIT_LOADING_MARKER, timeouts.submit_loading, timeouts.poll_interval) {
        warnings.push(format!("Could not wait for submit loading: {}", e));
    }
    if let Err(e) = wait::wait_for_absence(page, CHANGE_LOADING_MARKER, timeouts.change_loading, timeouts.poll_interval) {
        warnings.push(format!("Could not wait for change loading: {}", e));
    }

    warnings
}
