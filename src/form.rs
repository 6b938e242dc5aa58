//! Filling and submitting a form
//!
//! Fields are located by `name` inside the form whose `id` was given. How the
//! form is then submitted depends on what was asked for and on whether the
//! page is a LiveView:
//!
//! | button given | LiveView | action                                         |
//! |--------------|----------|------------------------------------------------|
//! | yes          | either   | click the matching button                      |
//! | no           | yes      | press Enter inside the form                    |
//! | no           | no       | click a `type=submit` element, else press Enter |
//!
//! A plain (non-LiveView) form is then given a short grace period and
//! watched until its URL changes; a LiveView form until its loading markers
//! clear.

use crate::config::{ButtonSpec, FormInput, Timeouts};
use crate::error::BrowserError;
use crate::framework;
use crate::page::Page;
use crate::stage::StageOutcome;
use crate::wait;

/// Key used to submit a form without clicking anything
pub const SUBMIT_KEY: &str = "Enter";

/// Escape a string for use inside a double-quoted CSS attribute value
///
/// Brackets are escaped too so names such as `user[remember_me]` stay literal.
pub fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Selector for the form container itself
pub fn form_selector(form_id: &str) -> String {
    format!("[id=\"{}\"]", escape_attribute_value(form_id))
}

/// Selector for the field called `name` inside the form
pub fn field_selector(form_id: &str, name: &str) -> String {
    format!(
        "{} :is(input, textarea, select)[name=\"{}\"]",
        form_selector(form_id),
        escape_attribute_value(name)
    )
}

/// Selector for the requested button; the value must match only when one was given
pub fn button_selector(form_id: &str, button: &ButtonSpec) -> String {
    let mut selector = format!(
        "{} :is(button, input[type=\"submit\"])[name=\"{}\"]",
        form_selector(form_id),
        escape_attribute_value(&button.name)
    );
    if let Some(value) = &button.value {
        selector.push_str(&format!("[value=\"{}\"]", escape_attribute_value(value)));
    }
    selector
}

/// Selector for any generic submit control inside the form
pub fn generic_submit_selector(form_id: &str) -> String {
    let form = form_selector(form_id);
    format!("{form} input[type=\"submit\"], {form} button[type=\"submit\"]")
}

/// Selector for the field that receives the Enter key
fn key_target_selector(form_id: &str) -> String {
    format!("{} input:not([type=\"hidden\"])", form_selector(form_id))
}

/// How the form gets submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStrategy {
    /// Click the button the caller named
    Button,
    /// Press Enter inside the form (LiveView's own submit path)
    EnterKey,
    /// Click a `type=submit` control, falling back to Enter
    SubmitControl,
}

impl SubmitStrategy {
    pub fn choose(button: Option<&ButtonSpec>, framework_active: bool) -> Self {
        match (button, framework_active) {
            (Some(_), _) => Self::Button,
            (None, true) => Self::EnterKey,
            (None, false) => Self::SubmitControl,
        }
    }
}

/// Fills and submits one form
pub struct FormSubmitter<'a, P: Page + ?Sized> {
    page: &'a P,
    form_id: &'a str,
    timeouts: &'a Timeouts,
}

impl<'a, P: Page + ?Sized> FormSubmitter<'a, P> {
    pub fn new(page: &'a P, form_id: &'a str, timeouts: &'a Timeouts) -> Self {
        Self { page, form_id, timeouts }
    }

    /// Fill `inputs` in order, submit, and wait for the page to settle
    ///
    /// Missing fields and failed clicks are fatal; waits that run out of time
    /// come back as warnings.
    pub fn submit(&self, inputs: &[FormInput], button: Option<&ButtonSpec>, framework_active: bool) -> StageOutcome {
        for input in inputs {
            if let Err(e) = self.fill(input) {
                return StageOutcome::Fatal(e);
            }
        }

        let strategy = SubmitStrategy::choose(button, framework_active);
        log::debug!("Submitting form '{}' via {:?}", self.form_id, strategy);

        // A plain form is judged by whether the URL moves, however it was submitted
        let before_submit = if framework_active { None } else { self.page.current_url().ok() };

        let submitted = match (strategy, button) {
            (SubmitStrategy::Button, Some(button)) => self.click_button(button),
            (SubmitStrategy::SubmitControl, _) => self.click_submit_control(),
            _ => self.press_submit_key(),
        };
        if let Err(e) = submitted {
            return StageOutcome::Fatal(e);
        }

        let warnings = if framework_active {
            let warnings = framework::wait_for_idle(self.page, self.timeouts);
            log::info!("LiveView form submitted and loading completed");
            warnings
        } else if let Some(before) = before_submit {
            self.wait_for_submit_navigation(&before)
        } else {
            log::info!("Form submitted");
            Vec::new()
        };

        StageOutcome::from_warnings(warnings)
    }

    fn fill(&self, input: &FormInput) -> Result<(), BrowserError> {
        let selector = field_selector(self.form_id, &input.name);
        self.page
            .fill(&selector, &input.value)
            .map_err(|e| BrowserError::FieldNotFound { name: input.name.clone(), reason: e.to_string() })
    }

    fn click_button(&self, button: &ButtonSpec) -> Result<(), BrowserError> {
        let selector = button_selector(self.form_id, button);
        log::info!("Clicking button '{}'", button.name);
        self.page.click(&selector)
    }

    fn click_submit_control(&self) -> Result<(), BrowserError> {
        let selector = generic_submit_selector(self.form_id);
        match self.page.click(&selector) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::debug!("No submit control clicked ({}), pressing {}", e, SUBMIT_KEY);
                self.press_submit_key()
            }
        }
    }

    fn press_submit_key(&self) -> Result<(), BrowserError> {
        let field = key_target_selector(self.form_id);
        let target = match self.page.exists(&field) {
            Ok(true) => field,
            _ => form_selector(self.form_id),
        };
        self.page.press_key(&target, SUBMIT_KEY).map_err(|e| BrowserError::InteractionFailed {
            selector: form_selector(self.form_id),
            reason: format!("could not submit form: {}", e),
        })
    }

    /// Give the submission a moment, then watch for the URL to move away from `before`
    fn wait_for_submit_navigation(&self, before: &str) -> Vec<String> {
        std::thread::sleep(self.timeouts.click_grace);

        match wait::wait_for_url_change(self.page, before, self.timeouts.click_navigation, self.timeouts.poll_interval) {
            Ok(()) => {
                log::info!("Form submitted, navigated away from {}", before);
                Vec::new()
            }
            Err(e) => vec![format!("No navigation detected after submitting: {}", e)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{CHANGE_LOADING_MARKER, SUBMIT_LOADING_MARKER};
    use crate::page::fake::{Call, FakePage};
    use std::time::Duration;

    fn quick() -> Timeouts {
        Timeouts {
            framework_connect: Duration::from_millis(20),
            submit_loading: Duration::from_millis(20),
            change_loading: Duration::from_millis(20),
            click_grace: Duration::ZERO,
            click_navigation: Duration::from_millis(20),
            script_ready: Duration::from_millis(20),
            poll_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_escape_brackets_and_quotes() {
        assert_eq!(escape_attribute_value("user[remember_me]"), r"user\[remember_me\]");
        assert_eq!(escape_attribute_value(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_attribute_value("plain"), "plain");
    }

    #[test]
    fn test_field_selector() {
        assert_eq!(
            field_selector("login", "user[email]"),
            r#"[id="login"] :is(input, textarea, select)[name="user\[email\]"]"#
        );
    }

    #[test]
    fn test_button_selector_with_and_without_value() {
        let by_name = button_selector("login", &ButtonSpec::new("commit"));
        assert_eq!(by_name, r#"[id="login"] :is(button, input[type="submit"])[name="commit"]"#);

        let by_value = button_selector("login", &ButtonSpec::with_value("submit_flag", "true"));
        assert_eq!(by_value, r#"[id="login"] :is(button, input[type="submit"])[name="submit_flag"][value="true"]"#);

        let empty_value = button_selector("login", &ButtonSpec::with_value("go", ""));
        assert!(empty_value.ends_with(r#"[name="go"][value=""]"#));
    }

    #[test]
    fn test_strategy_choice() {
        let button = ButtonSpec::new("go");
        assert_eq!(SubmitStrategy::choose(Some(&button), true), SubmitStrategy::Button);
        assert_eq!(SubmitStrategy::choose(Some(&button), false), SubmitStrategy::Button);
        assert_eq!(SubmitStrategy::choose(None, true), SubmitStrategy::EnterKey);
        assert_eq!(SubmitStrategy::choose(None, false), SubmitStrategy::SubmitControl);
    }

    #[test]
    fn test_fills_in_order_and_overwrites() {
        let user = field_selector("f", "user");
        let submit = generic_submit_selector("f");
        let page = FakePage::new()
            .with_element(&user)
            .with_element(&submit)
            .redirect_on(&submit, "http://x/done");
        let timeouts = quick();
        let inputs = [FormInput::new("user", "first"), FormInput::new("user", "second")];

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&inputs, None, false);

        assert!(outcome.is_ok());
        assert_eq!(page.value_of(&user).as_deref(), Some("second"));
        let fills: Vec<_> = page.calls().into_iter().filter(|c| matches!(c, Call::Fill(..))).collect();
        assert_eq!(
            fills,
            [Call::Fill(user.clone(), "first".to_string()), Call::Fill(user, "second".to_string())]
        );
    }

    #[test]
    fn test_missing_field_is_fatal_and_named() {
        let page = FakePage::new();
        let timeouts = quick();
        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("email", "x")], None, false);

        match outcome {
            StageOutcome::Fatal(BrowserError::FieldNotFound { name, .. }) => assert_eq!(name, "email"),
            other => panic!("Expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_login_scenario_clicks_named_button() {
        let user = field_selector("login", "user");
        let button = ButtonSpec::with_value("submit_flag", "true");
        let target = button_selector("login", &button);
        let page = FakePage::new()
            .with_element(&user)
            .with_element(&target)
            .redirect_on(&target, "http://x/welcome");
        let timeouts = quick();

        let outcome =
            FormSubmitter::new(&page, "login", &timeouts).submit(&[FormInput::new("user", "a")], Some(&button), false);

        assert!(outcome.is_ok(), "{:?}", outcome);
        assert_eq!(page.value_of(&user).as_deref(), Some("a"));
        assert!(page.calls().contains(&Call::Click(target)));
        assert_eq!(page.current_url().unwrap(), "http://x/welcome");
    }

    #[test]
    fn test_bracketed_button_name_matches_literally() {
        let button = ButtonSpec::new("user[remember_me]");
        let target = button_selector("f", &button);
        let page = FakePage::new().with_element(&target);
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[], Some(&button), true);

        assert!(!outcome.is_fatal());
        assert!(page.calls().contains(&Call::Click(target)));
    }

    #[test]
    fn test_missing_button_is_fatal() {
        let page = FakePage::new();
        let timeouts = quick();
        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[], Some(&ButtonSpec::new("go")), false);
        assert!(matches!(outcome, StageOutcome::Fatal(BrowserError::ElementNotFound(_))));
    }

    #[test]
    fn test_button_without_navigation_warns() {
        let button = ButtonSpec::new("go");
        let page = FakePage::new().with_element(&button_selector("f", &button));
        let timeouts = quick();

        match FormSubmitter::new(&page, "f", &timeouts).submit(&[], Some(&button), false) {
            StageOutcome::Warnings(w) => assert!(w[0].contains("No navigation detected")),
            other => panic!("Expected a navigation warning, got {:?}", other),
        }
    }

    #[test]
    fn test_liveview_presses_enter_even_with_submit_control() {
        let user = field_selector("f", "user");
        let key_target = key_target_selector("f");
        let page = FakePage::new()
            .with_element(&user)
            .with_element(&key_target)
            .with_element(&generic_submit_selector("f"));
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("user", "a")], None, true);

        assert!(outcome.is_ok());
        let calls = page.calls();
        assert!(calls.contains(&Call::PressKey(key_target, "Enter".to_string())));
        assert!(!calls.iter().any(|c| matches!(c, Call::Click(_))));
    }

    #[test]
    fn test_liveview_enter_goes_to_form_without_fields() {
        let form = form_selector("f");
        let page = FakePage::new().with_element(&form).with_element(&field_selector("f", "q"));
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "rust")], None, true);

        assert!(outcome.is_ok());
        assert!(page.calls().contains(&Call::PressKey(form, "Enter".to_string())));
    }

    #[test]
    fn test_liveview_stuck_loading_is_a_warning() {
        let form = form_selector("f");
        let page = FakePage::new()
            .with_element(&form)
            .with_element(&field_selector("f", "q"))
            .with_element(SUBMIT_LOADING_MARKER)
            .with_element(CHANGE_LOADING_MARKER);
        let timeouts = quick();

        match FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "x")], None, true) {
            StageOutcome::Warnings(w) => assert_eq!(w.len(), 2),
            other => panic!("Expected loading warnings, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_form_clicks_submit_control() {
        let submit = generic_submit_selector("f");
        let page = FakePage::new()
            .with_element(&field_selector("f", "q"))
            .with_element(&submit)
            .redirect_on(&submit, "http://x/session");
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "x")], None, false);

        assert!(outcome.is_ok(), "{:?}", outcome);
        assert!(page.calls().contains(&Call::Click(submit)));
        assert!(!page.calls().iter().any(|c| matches!(c, Call::PressKey(..))));
        assert_eq!(page.current_url().unwrap(), "http://x/session");
    }

    #[test]
    fn test_plain_form_submit_waits_for_navigation() {
        let submit = generic_submit_selector("f");
        let page = FakePage::new()
            .with_element(&field_selector("f", "email"))
            .with_element(&submit)
            .redirect_on(&submit, "http://x/session");
        let timeouts = Timeouts { click_grace: Duration::from_millis(5), ..quick() };

        let started = std::time::Instant::now();
        let outcome =
            FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("email", "a@b.c")], None, false);

        assert!(outcome.is_ok(), "{:?}", outcome);
        assert!(started.elapsed() >= Duration::from_millis(5));
        // The page has moved on by the time submit returns
        assert_eq!(page.current_url().unwrap(), "http://x/session");
    }

    #[test]
    fn test_plain_form_without_navigation_warns() {
        let submit = generic_submit_selector("f");
        let page = FakePage::new().with_element(&field_selector("f", "q")).with_element(&submit);
        let timeouts = quick();

        match FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "x")], None, false) {
            StageOutcome::Warnings(w) => {
                assert_eq!(w.len(), 1);
                assert!(w[0].contains("No navigation detected after submitting"));
            }
            other => panic!("Expected a navigation warning, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_form_falls_back_to_enter() {
        let form = form_selector("f");
        let page = FakePage::new()
            .with_element(&field_selector("f", "q"))
            .with_element(&form)
            .redirect_on(&form, "http://x/search");
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "x")], None, false);

        assert!(outcome.is_ok());
        assert!(page.calls().contains(&Call::PressKey(form, "Enter".to_string())));
    }

    #[test]
    fn test_plain_form_without_any_target_is_fatal() {
        let page = FakePage::new().with_element(&field_selector("f", "q"));
        let timeouts = quick();

        let outcome = FormSubmitter::new(&page, "f", &timeouts).submit(&[FormInput::new("q", "x")], None, false);

        assert!(matches!(outcome, StageOutcome::Fatal(BrowserError::InteractionFailed { .. })));
    }
}
