//! # webprobe
//!
//! Fetch a web page through headless Chrome, optionally fill and submit a form or run
//! some JavaScript on it, and get the result back as markdown (or raw HTML) that an
//! LLM agent can read.
//!
//! ## Features
//!
//! - **Real browser**: pages are rendered by Chrome via the DevTools Protocol, so
//!   JavaScript-built content shows up
//! - **Persistent profiles**: each named profile is its own Chrome user-data directory,
//!   so logins survive between invocations
//! - **Form driving**: fill fields by name and submit by button, submit control or Enter
//! - **Phoenix LiveView aware**: waits for the socket to connect and for loading states
//!   to clear after a submit
//! - **Console capture**: everything the page logs is appended to the output
//!
//! ## Command line
//!
//! ```bash
//! web https://example.com
//! web https://example.com --screenshot page.png --truncate-after 5000
//! web localhost:4000/login --form login_form --input email --value test@example.com \
//!     --input password --value secret
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use webprobe::{LaunchOptions, SessionConfig, fetch_page};
//!
//! # fn main() -> webprobe::Result<()> {
//! let config = SessionConfig::new("example.com").truncate_after(5000);
//! let result = fetch_page(&config, &LaunchOptions::default())?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
//!
//! Any [`Page`] implementation can be driven directly with an [`Orchestrator`]:
//!
//! ```rust,no_run
//! use webprobe::{BrowserSession, LaunchOptions, Orchestrator, SessionConfig};
//!
//! # fn main() -> webprobe::Result<()> {
//! let session = BrowserSession::open(&LaunchOptions::default(), "work")?;
//! let config = SessionConfig::new("localhost:4000/login")
//!     .profile("work")
//!     .form("login")
//!     .input("email", "me@example.com");
//! let result = Orchestrator::new(&session, &config).run()?;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome launch options, profiles and the session
//! - [`orchestrator`]: the stage sequence of one run
//! - [`framework`], [`form`], [`script`]: the interactive stages
//! - [`render`]: markdown conversion and truncation
//! - [`wait`]: the bounded polling used by every wait
//! - [`error`]: error types and result aliases

pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod framework;
pub mod orchestrator;
pub mod page;
pub mod render;
pub mod result;
pub mod script;
pub mod stage;
pub mod wait;

#[cfg(feature = "cli")]
pub mod cli;

pub use browser::{BrowserSession, LaunchOptions, Profile};
pub use config::{ButtonSpec, FormInput, SessionConfig, Timeouts};
pub use console::{ConsoleLevel, ConsoleRecord};
pub use error::{BrowserError, Result};
pub use orchestrator::{Orchestrator, fetch_page};
pub use page::Page;
pub use result::SessionResult;
pub use stage::{Stage, StageOutcome};
