//! Command-line surface of the `web` binary
//!
//! Most options map one-to-one onto [`SessionConfig`]. The exception is
//! `--value`, which belongs to whichever `--input` or `--button` came right
//! before it, so pairing is done from the argument positions clap records.

use crate::browser::LaunchOptions;
use crate::config::{
    ButtonSpec, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROFILE, DEFAULT_TRUNCATE_AFTER, FormInput, SessionConfig,
};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

const AFTER_HELP: &str = "\
Phoenix LiveView Support:
  Pages carrying [data-phx-session] are detected automatically:
  - the tool waits for the LiveView connection (.phx-connected)
  - forms are submitted with Enter and the loading states are waited out

Navigation Wait:
  --wait-for-navigation takes an optional timeout, so a bare number right
  after it is read as milliseconds. Put the URL before the flag.

Examples:
  web https://example.com
  web https://example.com --screenshot page.png --truncate-after 5000
  web localhost:4000/login --form login_form --input email --value test@example.com --input password --value secret
  web localhost:3000/session --form new_user --input user[email] --value a@b.c --button commit --value 'Log in'
  web localhost:4000 --js \"document.querySelector('a').click()\" --wait-for-navigation 2000";

/// portable web scraper for llms
#[derive(Debug, Parser)]
#[command(name = "web", version, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Page to fetch; http:// is assumed when no scheme is given
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output raw page instead of converting to markdown
    #[arg(long)]
    pub raw: bool,

    /// Truncate output after <NUMBER> characters and append a notice
    #[arg(long, value_name = "NUMBER", default_value_t = DEFAULT_TRUNCATE_AFTER, value_parser = parse_limit)]
    pub truncate_after: usize,

    /// Take a full-page screenshot and save it to the given filepath
    #[arg(long, value_name = "FILEPATH")]
    pub screenshot: Option<PathBuf>,

    /// The id of the form for --input and --button
    #[arg(long, value_name = "ID")]
    pub form: Option<String>,

    /// Name attribute of a form field to fill (repeatable)
    #[arg(long, value_name = "NAME")]
    pub input: Vec<String>,

    /// Name attribute of the button to click instead of a generic submit
    #[arg(long, value_name = "NAME")]
    pub button: Option<String>,

    /// Value for the preceding --input, or value attribute for the preceding --button
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub value: Vec<String>,

    /// After form submission, load this URL before converting to markdown
    #[arg(long, value_name = "URL")]
    pub after_submit: Option<String>,

    /// Execute JavaScript code on the page after it loads
    #[arg(long, value_name = "CODE", allow_hyphen_values = true)]
    pub js: Option<String>,

    /// Wait for a navigation triggered by --js (default: 5000 ms); give the URL before this flag
    #[arg(long, value_name = "MS")]
    pub wait_for_navigation: Option<Option<u64>>,

    /// Use or create named session profile
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chrome/Chromium executable to use
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

/// A fully parsed command line
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config: SessionConfig,
    pub launch: LaunchOptions,
    pub json: bool,
}

impl Invocation {
    /// Parse `args` (program name first)
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Cli::command().try_get_matches_from(args)?;
        let cli = Cli::from_arg_matches(&matches)?;
        let (inputs, button) = pair_values(&matches, &cli);

        let mut config = SessionConfig::new(&cli.url)
            .profile(cli.profile)
            .raw(cli.raw)
            .truncate_after(cli.truncate_after);
        config.inputs = inputs;
        config.button = button;
        config.form_id = cli.form;
        config.screenshot = cli.screenshot;
        config.script = cli.js;
        if let Some(url) = &cli.after_submit {
            config = config.after_submit(url);
        }
        if let Some(ms) = cli.wait_for_navigation {
            let timeout = ms.map_or(DEFAULT_NAVIGATION_TIMEOUT, Duration::from_millis);
            config = config.wait_for_navigation(timeout);
        }

        let mut launch = LaunchOptions::new().headless(!cli.headed);
        launch.chrome_path = cli.chrome_path;

        Ok(Self { config, launch, json: cli.json })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Input(usize),
    Button,
}

/// Attach every `--value` to the closest `--input`/`--button` before it
fn pair_values(matches: &ArgMatches, cli: &Cli) -> (Vec<FormInput>, Option<ButtonSpec>) {
    let mut owners: Vec<(usize, Owner)> = matches
        .indices_of("input")
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, position)| (position, Owner::Input(i)))
        .collect();
    if let Some(position) = matches.index_of("button") {
        owners.push((position, Owner::Button));
    }
    owners.sort_by_key(|(position, _)| *position);

    let mut input_values: Vec<Option<String>> = vec![None; cli.input.len()];
    let mut button_value = None;

    let values = matches.indices_of("value").into_iter().flatten().zip(&cli.value);
    for (position, value) in values {
        let owner = owners.iter().rev().find(|(owner_position, _)| *owner_position < position);
        let slot = match owner {
            Some((_, Owner::Input(i))) => &mut input_values[*i],
            Some((_, Owner::Button)) => &mut button_value,
            None => {
                log::warn!("Ignoring --value {:?}: no --input or --button before it", value);
                continue;
            }
        };
        if slot.is_some() {
            log::warn!("Ignoring extra --value {:?}", value);
            continue;
        }
        *slot = Some(value.clone());
    }

    let inputs = cli
        .input
        .iter()
        .zip(input_values)
        .map(|(name, value)| FormInput::new(name.clone(), value.unwrap_or_default()))
        .collect();
    let button = cli.button.as_ref().map(|name| ButtonSpec { name: name.clone(), value: button_value });

    (inputs, button)
}
