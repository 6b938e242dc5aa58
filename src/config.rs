//! Per-run session configuration

use crate::browser::profile::validate_profile_name;
use crate::error::{BrowserError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Character limit applied when no `--truncate-after` is given
pub const DEFAULT_TRUNCATE_AFTER: usize = 100_000;

/// Profile used when none is named
pub const DEFAULT_PROFILE: &str = "default";

/// Post-script navigation wait used when `--wait-for-navigation` has no value
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Prefix `http://` unless the URL already names a scheme the browser handles
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("data:")
        || trimmed.starts_with("about:")
        || trimmed.starts_with("chrome://")
    {
        return trimmed.to_string();
    }

    format!("http://{}", trimmed)
}

/// A form field to fill, by `name` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub value: String,
}

impl FormInput {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// The button to click instead of a generic submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub name: String,
    /// When set, the button's `value` attribute must match exactly
    pub value: Option<String>,
}

impl ButtonSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }
}

/// Bounds for every wait performed during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// LiveView `.phx-connected` after the first load
    pub framework_connect: Duration,
    /// `.phx-submit-loading` clearing after a LiveView submit
    pub submit_loading: Duration,
    /// `.phx-change-loading` clearing after a LiveView submit
    pub change_loading: Duration,
    /// Pause after a button click before watching the URL
    pub click_grace: Duration,
    /// URL change after a button click on a plain form
    pub click_navigation: Duration,
    /// `document.readyState` after a script-triggered navigation
    pub script_ready: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            framework_connect: Duration::from_millis(10_000),
            submit_loading: Duration::from_millis(10_000),
            change_loading: Duration::from_millis(5_000),
            click_grace: Duration::from_millis(500),
            click_navigation: Duration::from_millis(5_000),
            script_ready: Duration::from_millis(3_000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Everything one run needs to know, fixed before the browser starts
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub url: String,
    pub profile: String,
    pub raw: bool,
    pub truncate_after: usize,
    pub screenshot: Option<PathBuf>,
    pub form_id: Option<String>,
    pub inputs: Vec<FormInput>,
    pub button: Option<ButtonSpec>,
    pub after_submit: Option<String>,
    pub script: Option<String>,
    /// Wait this long for a navigation caused by `script`
    pub wait_for_navigation: Option<Duration>,
    pub timeouts: Timeouts,
}

impl SessionConfig {
    /// Configuration for `url` with every option at its default
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_url(url),
            profile: DEFAULT_PROFILE.to_string(),
            raw: false,
            truncate_after: DEFAULT_TRUNCATE_AFTER,
            screenshot: None,
            form_id: None,
            inputs: Vec::new(),
            button: None,
            after_submit: None,
            script: None,
            wait_for_navigation: None,
            timeouts: Timeouts::default(),
        }
    }

    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.profile = name.into();
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn truncate_after(mut self, limit: usize) -> Self {
        self.truncate_after = limit;
        self
    }

    pub fn screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    pub fn form(mut self, id: impl Into<String>) -> Self {
        self.form_id = Some(id.into());
        self
    }

    /// Queue a field fill; fields are filled in the order they are added
    pub fn input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.push(FormInput::new(name, value));
        self
    }

    pub fn button(mut self, button: ButtonSpec) -> Self {
        self.button = Some(button);
        self
    }

    pub fn after_submit(mut self, url: &str) -> Self {
        self.after_submit = Some(normalize_url(url));
        self
    }

    pub fn script(mut self, code: impl Into<String>) -> Self {
        self.script = Some(code.into());
        self
    }

    pub fn wait_for_navigation(mut self, timeout: Duration) -> Self {
        self.wait_for_navigation = Some(timeout);
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Whether the form stage has anything to do
    pub fn wants_form_submission(&self) -> bool {
        self.form_id.is_some() && (!self.inputs.is_empty() || self.button.is_some())
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.truncate_after == 0 {
            return Err(BrowserError::InvalidConfig("truncation limit must be greater than zero".to_string()));
        }
        if self.url.trim_start_matches("http://").is_empty() {
            return Err(BrowserError::InvalidConfig("a URL is required".to_string()));
        }
        if matches!(self.form_id.as_deref(), Some("")) {
            return Err(BrowserError::InvalidConfig("form id must not be empty".to_string()));
        }
        validate_profile_name(&self.profile)
    }
}
