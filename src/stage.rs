//! Steps of a session run and how each one ended

use crate::error::{BrowserError, Result};
use std::fmt;

/// The steps of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigate,
    DetectFramework,
    SubmitForm,
    RunScript,
    Screenshot,
    FollowUp,
    Extract,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigate => "navigate",
            Self::DetectFramework => "detect-framework",
            Self::SubmitForm => "submit-form",
            Self::RunScript => "run-script",
            Self::Screenshot => "screenshot",
            Self::FollowUp => "follow-up-navigate",
            Self::Extract => "extract-content",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// How a stage ended
///
/// Warnings never stop the run; a fatal outcome ends it.
#[derive(Debug)]
pub enum StageOutcome {
    Ok,
    Warnings(Vec<String>),
    Fatal(BrowserError),
}

impl StageOutcome {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warnings(vec![message.into()])
    }

    /// `Ok` when nothing went wrong, otherwise the collected warnings
    pub fn from_warnings(warnings: Vec<String>) -> Self {
        if warnings.is_empty() { Self::Ok } else { Self::Warnings(warnings) }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<BrowserError> for StageOutcome {
    fn from(error: BrowserError) -> Self {
        Self::Fatal(error)
    }
}

/// A step that either works or ends the run
impl From<Result<()>> for StageOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(e) => Self::Fatal(e),
        }
    }
}
