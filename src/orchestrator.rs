//! The run itself: one page driven through a fixed sequence of stages
//!
//! ```text
//! navigate → detect-framework → [submit-form] → [run-script] → [screenshot]
//!          → [follow-up-navigate] → extract-content → [render] → [truncate]
//! ```
//!
//! Bracketed stages only run when configured. Each stage reports a
//! [`StageOutcome`]; warnings are logged and kept on the result, the first
//! fatal outcome ends the run.

use crate::browser::{BrowserSession, LaunchOptions};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::form::FormSubmitter;
use crate::framework;
use crate::page::Page;
use crate::render::{render_markdown, truncate};
use crate::result::SessionResult;
use crate::script::run_script;
use crate::stage::{Stage, StageOutcome};

/// Drives one page through one configured run
pub struct Orchestrator<'a, P: Page + ?Sized> {
    page: &'a P,
    config: &'a SessionConfig,
    warnings: Vec<String>,
}

impl<'a, P: Page + ?Sized> Orchestrator<'a, P> {
    pub fn new(page: &'a P, config: &'a SessionConfig) -> Self {
        Self { page, config, warnings: Vec::new() }
    }

    /// Run every configured stage and assemble the result
    pub fn run(mut self) -> Result<SessionResult> {
        let config = self.config;
        config.validate()?;

        log::info!("Navigating to {}", config.url);
        self.settle(Stage::Navigate, self.page.navigate(&config.url).into())?;

        let detection = framework::detect(self.page, &config.timeouts);
        self.settle(Stage::DetectFramework, detection.outcome)?;

        if let Some(form_id) = config.form_id.as_deref().filter(|_| config.wants_form_submission()) {
            let submitter = FormSubmitter::new(self.page, form_id, &config.timeouts);
            let outcome = submitter.submit(&config.inputs, config.button.as_ref(), detection.active);
            self.settle(Stage::SubmitForm, outcome)?;
        }

        if let Some(script) = &config.script {
            let outcome = run_script(self.page, script, config.wait_for_navigation, &config.timeouts);
            self.settle(Stage::RunScript, outcome)?;
        }

        if let Some(path) = &config.screenshot {
            self.settle(Stage::Screenshot, self.page.screenshot(path).into())?;
            log::info!("Screenshot saved to {}", path.display());
        }

        if let Some(url) = &config.after_submit {
            log::info!("Navigating to after-submit URL: {}", url);
            self.settle(Stage::FollowUp, self.page.navigate(url).into())?;
        }

        let markup = self
            .page
            .content()
            .inspect_err(|e| log::debug!("Stage {} failed: {}", Stage::Extract, e))?;
        let final_url = self.page.current_url().unwrap_or_else(|_| config.url.clone());

        let content = if config.raw {
            markup
        } else {
            log::debug!("Stage {}: {} bytes of markup", Stage::Render, markup.len());
            render_markdown(&markup)
        };
        let (content, truncation) = truncate(content, config.truncate_after);

        Ok(SessionResult {
            url: config.url.clone(),
            final_url,
            content,
            truncation,
            console: self.page.console_records(),
            warnings: self.warnings,
        })
    }

    /// Log and keep warnings; turn a fatal outcome into the run's error
    fn settle(&mut self, stage: Stage, outcome: StageOutcome) -> Result<()> {
        match outcome {
            StageOutcome::Ok => {
                log::debug!("Stage {} done", stage);
                Ok(())
            }
            StageOutcome::Warnings(warnings) => {
                for warning in warnings {
                    log::warn!("{}: {}", stage, warning);
                    self.warnings.push(warning);
                }
                Ok(())
            }
            StageOutcome::Fatal(e) => {
                log::debug!("Stage {} failed: {}", stage, e);
                Err(e)
            }
        }
    }
}

/// Launch Chrome on the configured profile, run the session, and shut Chrome down
pub fn fetch_page(config: &SessionConfig, options: &LaunchOptions) -> Result<SessionResult> {
    config.validate()?;
    let session = BrowserSession::open(options, &config.profile)?;
    Orchestrator::new(&session, config).run()
}
