//! What a run produces and how it is printed
//!
//! The text form frames the requested URL between `=` rules, then prints the
//! content. A truncation notice and the console section follow when present.
//! `--json` serializes the same struct instead.

use crate::console::ConsoleRecord;
use crate::render::Truncation;
use serde::{Deserialize, Serialize};
use std::fmt;

const URL_RULE: &str = "==========================";

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// The URL that was requested, after protocol defaulting
    pub url: String,

    /// Where the page ended up when its content was read
    pub final_url: String,

    /// Page markup or its markdown rendering, possibly cut short
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,

    /// Console output, in the order the page emitted it
    #[serde(default)]
    pub console: Vec<ConsoleRecord>,

    /// Non-fatal problems met along the way
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URL_RULE}\n{}\n{URL_RULE}\n\n{}", self.url, self.content)?;

        if let Some(truncation) = &self.truncation {
            write!(f, "\n\n{}", truncation.notice())?;
        }

        if !self.console.is_empty() {
            let rule = "=".repeat(50);
            write!(f, "\n\n{rule}\nCONSOLE OUTPUT:\n{rule}\n")?;
            for record in &self.console {
                writeln!(f, "{}", record)?;
            }
        }

        Ok(())
    }
}
