//! The page operations the session workflow relies on
//!
//! [`BrowserSession`](crate::browser::BrowserSession) implements [`Page`] on top of
//! a Chrome tab. Keeping the workflow behind this trait lets framework detection,
//! form submission and script handling run against any page driver.

use crate::console::ConsoleRecord;
use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// A single loaded page that can be inspected and driven
pub trait Page {
    /// Load `url` and wait for the navigation to finish
    fn navigate(&self, url: &str) -> Result<()>;

    /// The URL currently shown by the page
    fn current_url(&self) -> Result<String>;

    /// Evaluate a JavaScript expression and return its value
    fn evaluate(&self, script: &str) -> Result<Value>;

    /// Whether any element matches `selector`
    fn exists(&self, selector: &str) -> Result<bool>;

    /// Replace the value of the first element matching `selector`
    fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Click the first element matching `selector`
    fn click(&self, selector: &str) -> Result<()>;

    /// Focus the first element matching `selector` and press `key`
    fn press_key(&self, selector: &str, key: &str) -> Result<()>;

    /// Capture the full page as PNG into `path`
    fn screenshot(&self, path: &Path) -> Result<()>;

    /// Serialized markup of the current document
    fn content(&self) -> Result<String>;

    /// Console messages captured since the page was opened
    fn console_records(&self) -> Vec<ConsoleRecord>;
}
