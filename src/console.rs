//! Console messages captured from the page

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a console message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Debug,
    Info,
    Warning,
    Error,
    /// Any other console API (`table`, `trace`, `assert`, ...)
    Other(String),
}

impl ConsoleLevel {
    /// Map a console API call type name (`"log"`, `"warning"`, `"Warning"`, ...) to a level
    pub fn from_api_type(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "log" => Self::Log,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warning" | "warn" => Self::Warning,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Log => "log",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().to_ascii_uppercase())
    }
}

/// One console message, as emitted by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleRecord {
    pub level: ConsoleLevel,
    pub text: String,
}

impl ConsoleRecord {
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

impl fmt::Display for ConsoleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Append-only console buffer shared with the browser's event thread
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    records: Arc<Mutex<Vec<ConsoleRecord>>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ConsoleRecord) {
        let mut records = self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(record);
    }

    /// Copy of everything captured so far, in arrival order
    pub fn snapshot(&self) -> Vec<ConsoleRecord> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_api_type() {
        assert_eq!(ConsoleLevel::from_api_type("log"), ConsoleLevel::Log);
        assert_eq!(ConsoleLevel::from_api_type("Warning"), ConsoleLevel::Warning);
        assert_eq!(ConsoleLevel::from_api_type("warn"), ConsoleLevel::Warning);
        assert_eq!(ConsoleLevel::from_api_type("Error"), ConsoleLevel::Error);
        assert_eq!(ConsoleLevel::from_api_type("table"), ConsoleLevel::Other("table".to_string()));
    }

    #[test]
    fn test_record_display() {
        let record = ConsoleRecord::new(ConsoleLevel::Warning, "careful");
        assert_eq!(record.to_string(), "[WARNING] careful");
        let record = ConsoleRecord::new(ConsoleLevel::Other("trace".to_string()), "here");
        assert_eq!(record.to_string(), "[TRACE] here");
    }

    #[test]
    fn test_console_log_preserves_order_across_threads() {
        let log = ConsoleLog::new();
        let writer = log.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..50 {
                writer.push(ConsoleRecord::new(ConsoleLevel::Log, i.to_string()));
            }
        });
        handle.join().unwrap();

        let records = log.snapshot();
        assert_eq!(records.len(), 50);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.text, i.to_string());
        }
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&ConsoleRecord::new(ConsoleLevel::Error, "boom")).unwrap();
        assert_eq!(json, r#"{"level":"error","text":"boom"}"#);
    }
}
