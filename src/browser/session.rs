use crate::browser::config::LaunchOptions;
use crate::browser::profile::{Profile, default_profile_root};
use crate::console::{ConsoleLevel, ConsoleLog, ConsoleRecord};
use crate::error::{BrowserError, Result};
use crate::page::Page;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshot, CaptureScreenshotFormatOption, Viewport};
use headless_chrome::protocol::cdp::Runtime;
use headless_chrome::protocol::cdp::Runtime::events::ConsoleAPICalledEventParams;
use headless_chrome::protocol::cdp::Runtime::{ConsoleAPICalledEventTypeOption, RemoteObject};
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, Tab};
use serde_json::Value;
use std::{ffi::OsStr, path::Path, sync::Arc, time::Duration};

/// Sets a field's value the way typing would, so framework listeners see it
const FILL_FN: &str = r#"
    function (value) {
        this.focus();
        this.value = value;
        this.dispatchEvent(new Event('input', { bubbles: true }));
        this.dispatchEvent(new Event('change', { bubbles: true }));
    }
"#;

const PAGE_SIZE_JS: &str = r#"
    JSON.stringify([
        Math.max(document.documentElement.scrollWidth, document.body ? document.body.scrollWidth : 0),
        Math.max(document.documentElement.scrollHeight, document.body ? document.body.scrollHeight : 0)
    ])
"#;

/// Symlink Chrome holds in its user data directory while running
const SINGLETON_LOCK: &str = "SingletonLock";

/// How long Chrome gets to write cookies and storage back after being asked to quit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One Chrome process bound to a profile, driving a single tab
///
/// The browser process is shut down when the session is dropped, so a run
/// releases it whether it finished or bailed out on an error. Chrome is asked
/// to quit first and only killed once it has released the profile, since a
/// kill drops cookie and storage writes it has not committed yet.
pub struct BrowserSession {
    /// Kept alive for the tab; dropping it kills Chrome
    browser: Browser,

    tab: Arc<Tab>,

    profile: Profile,

    console: ConsoleLog,
}

impl BrowserSession {
    /// Launch Chrome on the named profile under the configured profile root
    pub fn open(options: &LaunchOptions, profile_name: &str) -> Result<Self> {
        let root = match &options.profile_root {
            Some(root) => root.clone(),
            None => default_profile_root()?,
        };
        let profile = Profile::open(&root, profile_name)?;
        Self::launch(options, profile)
    }

    /// Launch Chrome with `profile` as its user data directory
    pub fn launch(options: &LaunchOptions, profile: Profile) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A long LiveView wait must not trip the idle watchdog
        launch_opts.idle_browser_timeout = Duration::from_secs(10 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;
        launch_opts.user_data_dir = Some(profile.dir().to_path_buf());

        if let Some(path) = &options.chrome_path {
            launch_opts.path = Some(path.clone());
        }

        #[cfg(feature = "fetch")]
        {
            let install_dir = profile.dir().parent().and_then(Path::parent).map(|state| state.join("chromium"));
            launch_opts.fetcher_options = headless_chrome::browser::FetcherOptions::default().with_install_dir(install_dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        let console = ConsoleLog::new();
        Self::capture_console(&tab, console.clone())?;

        log::info!("Browser started with profile '{}'", profile.name());

        Ok(Self { browser, tab, profile, console })
    }

    /// Record every console API call the page makes into `console`
    fn capture_console(tab: &Arc<Tab>, console: ConsoleLog) -> Result<()> {
        tab.call_method(Runtime::Enable(None))
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to enable runtime events: {}", e)))?;

        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::RuntimeConsoleAPICalled(called) = event {
                console.push(console_record(&called.params));
            }
        }))
        .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to subscribe to console events: {}", e)))?;

        Ok(())
    }

    /// The tab this session drives
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// The underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    fn find_element(&self, css_selector: &str) -> Result<headless_chrome::Element<'_>> {
        self.tab
            .find_element(css_selector)
            .map_err(|e| BrowserError::ElementNotFound(format!("Element '{}' not found: {}", css_selector, e)))
    }

    /// SIGTERM Chrome and wait for it to drop the profile lock
    #[cfg(unix)]
    fn shut_down(&self) {
        use crate::wait::wait_until;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let Some(pid) = self.browser.get_process_id().and_then(|pid| i32::try_from(pid).ok()) else {
            return;
        };

        let lock = self.profile.dir().join(SINGLETON_LOCK);
        // The lock is a dangling symlink, so `exists()` would always be false
        let locked = || std::fs::symlink_metadata(&lock).is_ok();
        if !locked() {
            log::debug!("No {} in profile '{}', not waiting for shutdown", SINGLETON_LOCK, self.profile.name());
        }

        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
            log::debug!("Failed to signal Chrome (pid {}): {}", pid, e);
            return;
        }

        match wait_until("Chrome to release the profile", SHUTDOWN_GRACE, Duration::from_millis(50), || Ok(!locked())) {
            Ok(()) => log::info!("Browser closed, profile '{}' saved", self.profile.name()),
            Err(e) => log::warn!("Chrome did not exit cleanly, recent profile changes may be lost: {}", e),
        }
    }

    #[cfg(not(unix))]
    fn shut_down(&self) {}
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.shut_down();
    }
}

impl Page for BrowserSession {
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        // location.href sees pushState navigations; the target URL is the fallback mid-load
        match self.evaluate("window.location.href") {
            Ok(Value::String(url)) => Ok(url),
            _ => Ok(self.tab.get_url()),
        }
    }

    fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        let literal = serde_json::to_string(selector).map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;
        let found = self.evaluate(&format!("document.querySelector({}) !== null", literal))?;
        Ok(found.as_bool().unwrap_or(false))
    }

    fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.find_element(selector)?;
        element
            .call_js_fn(FILL_FN, vec![Value::String(value.to_string())], false)
            .map_err(|e| BrowserError::InteractionFailed { selector: selector.to_string(), reason: e.to_string() })?;
        Ok(())
    }

    fn click(&self, selector: &str) -> Result<()> {
        let element = self.find_element(selector)?;
        element
            .click()
            .map_err(|e| BrowserError::InteractionFailed { selector: selector.to_string(), reason: e.to_string() })?;
        Ok(())
    }

    fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        let element = self.find_element(selector)?;
        element
            .focus()
            .map_err(|e| BrowserError::InteractionFailed { selector: selector.to_string(), reason: e.to_string() })?;
        self.tab
            .press_key(key)
            .map_err(|e| BrowserError::InteractionFailed { selector: selector.to_string(), reason: e.to_string() })?;
        Ok(())
    }

    fn screenshot(&self, path: &Path) -> Result<()> {
        let size = self.evaluate(PAGE_SIZE_JS)?;
        let (width, height) = size
            .as_str()
            .and_then(|json| serde_json::from_str::<(f64, f64)>(json).ok())
            .ok_or_else(|| BrowserError::ScreenshotFailed("Could not measure the page".to_string()))?;

        let clip = Viewport { x: 0.0, y: 0.0, width: width.max(1.0), height: height.max(1.0), scale: 1.0 };

        // The tab helper leaves captureBeyondViewport unset, which blanks everything below the window
        let data = self
            .tab
            .call_method(CaptureScreenshot {
                format: Some(CaptureScreenshotFormatOption::Png),
                quality: None,
                clip: Some(clip),
                from_surface: Some(true),
                capture_beyond_viewport: Some(true),
                optimize_for_speed: None,
            })
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?
            .data;
        let png = BASE64_STANDARD
            .decode(data)
            .map_err(|e| BrowserError::ScreenshotFailed(format!("Invalid screenshot data: {}", e)))?;

        std::fs::write(path, png)
            .map_err(|e| BrowserError::ScreenshotFailed(format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(())
    }

    fn content(&self) -> Result<String> {
        // Let a navigation already under way land before serializing
        if let Err(e) = self.tab.wait_until_navigated() {
            log::debug!("Navigation still pending before content read: {}", e);
        }
        self.tab.get_content().map_err(|e| BrowserError::ContentUnavailable(e.to_string()))
    }

    fn console_records(&self) -> Vec<ConsoleRecord> {
        self.console.snapshot()
    }
}

/// Build a record from a `Runtime.consoleAPICalled` event
fn console_record(params: &ConsoleAPICalledEventParams) -> ConsoleRecord {
    let level = match &params.Type {
        ConsoleAPICalledEventTypeOption::Log => ConsoleLevel::Log,
        ConsoleAPICalledEventTypeOption::Debug => ConsoleLevel::Debug,
        ConsoleAPICalledEventTypeOption::Info => ConsoleLevel::Info,
        ConsoleAPICalledEventTypeOption::Warning => ConsoleLevel::Warning,
        ConsoleAPICalledEventTypeOption::Error => ConsoleLevel::Error,
        other => ConsoleLevel::Other(protocol_name(other)),
    };

    let text = params.args.iter().map(remote_object_text).collect::<Vec<_>>().join(" ");
    ConsoleRecord::new(level, text)
}

/// Render one console argument roughly the way devtools prints it
fn remote_object_text(arg: &RemoteObject) -> String {
    match &arg.value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => arg.description.clone().unwrap_or_else(|| protocol_name(&arg.Type)),
        Some(other) => other.to_string(),
    }
}

/// The wire name of a protocol enum value (`"table"`, `"undefined"`, ...)
fn protocol_name<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ConsoleAPICalledEventParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_console_record_from_params() {
        let params = params(json!({
            "type": "warning",
            "args": [
                { "type": "string", "value": "disk at" },
                { "type": "number", "value": 93 },
                { "type": "object", "description": "Object" }
            ],
            "executionContextId": 1,
            "timestamp": 0.0
        }));

        let record = console_record(&params);
        assert_eq!(record.level, ConsoleLevel::Warning);
        assert_eq!(record.text, "disk at 93 Object");
    }

    #[test]
    fn test_console_record_undefined_argument() {
        let params = params(json!({
            "type": "log",
            "args": [{ "type": "undefined" }],
            "executionContextId": 1,
            "timestamp": 0.0
        }));
        assert_eq!(console_record(&params).to_string(), "[LOG] undefined");
    }

    #[test]
    fn test_console_record_other_api() {
        let params = params(json!({
            "type": "table",
            "args": [{ "type": "string", "value": "rows" }],
            "executionContextId": 1,
            "timestamp": 0.0
        }));
        let record = console_record(&params);
        assert_eq!(record.level, ConsoleLevel::Other("table".to_string()));
        assert_eq!(record.to_string(), "[TABLE] rows");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_open_session() {
        let root = tempfile::tempdir().unwrap();
        let options = LaunchOptions::new().sandbox(false).profile_root(root.path());
        let session = BrowserSession::open(&options, "unit").expect("Failed to launch browser");

        session.navigate("about:blank").expect("Failed to navigate");
        assert_eq!(session.current_url().unwrap(), "about:blank");
        assert!(root.path().join("unit").is_dir());
    }
}
