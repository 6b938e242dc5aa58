//! Named browser profiles
//!
//! A profile is a Chrome user-data directory under a fixed root. Reusing a
//! profile name reuses its cookies and storage, which is how logins survive
//! between invocations. Two runs sharing a profile at the same time are not
//! coordinated.

use crate::error::{BrowserError, Result};
use std::path::{Path, PathBuf};

/// Directory under the home directory that holds everything the tool caches
pub const STATE_DIR: &str = ".web-chrome";

/// `~/.web-chrome/profiles`
pub fn default_profile_root() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| BrowserError::InvalidProfile {
        name: String::new(),
        reason: "could not determine the home directory".to_string(),
    })?;
    Ok(home.join(STATE_DIR).join("profiles"))
}

/// Check that `name` can be used verbatim as a single directory name
pub fn validate_profile_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| BrowserError::InvalidProfile { name: name.to_string(), reason: reason.to_string() };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name refers to a parent or current directory"));
    }
    if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))) {
        return Err(invalid(&format!("character {:?} is not allowed", c)));
    }
    Ok(())
}

/// A resolved profile directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    dir: PathBuf,
}

impl Profile {
    /// Resolve `name` under `root` without touching the filesystem
    pub fn resolve(root: &Path, name: &str) -> Result<Self> {
        validate_profile_name(name)?;
        Ok(Self { name: name.to_string(), dir: root.join(name) })
    }

    /// Resolve `name` and create its directory if needed
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        let profile = Self::resolve(root, name)?;
        std::fs::create_dir_all(&profile.dir).map_err(|e| BrowserError::InvalidProfile {
            name: name.to_string(),
            reason: format!("cannot create {}: {}", profile.dir.display(), e),
        })?;
        log::debug!("Using profile '{}' at {}", profile.name, profile.dir.display());
        Ok(profile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
