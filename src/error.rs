use std::time::Duration;

use thiserror::Error;

/// Errors raised while driving a page
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// A tab could not be created or queried
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// The browser could not load a URL
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// No element matched a selector
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A form field named on the command line is missing from the form
    #[error("Could not fill input '{name}': {reason}")]
    FieldNotFound { name: String, reason: String },

    /// Clicking or key-pressing an element failed
    #[error("Interaction with '{selector}' failed: {reason}")]
    InteractionFailed { selector: String, reason: String },

    /// JavaScript evaluation failed or threw
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A screenshot could not be captured or written
    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    /// The page markup could not be retrieved
    #[error("Could not get page content: {0}")]
    ContentUnavailable(String),

    /// The profile name or directory is unusable
    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// A session configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bounded wait ran out of time
    #[error("Timed out after {elapsed:?} waiting for {condition}")]
    Timeout { condition: String, elapsed: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BrowserError>;
