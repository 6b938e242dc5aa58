//! Browser session management
//!
//! - [`LaunchOptions`]: how Chrome is started
//! - [`profile`]: named, persistent user-data directories
//! - [`BrowserSession`]: one Chrome process and the tab a run drives

pub mod config;
pub mod profile;
pub mod session;

pub use config::LaunchOptions;
pub use profile::{Profile, default_profile_root};
pub use session::BrowserSession;
