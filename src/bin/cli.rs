//! `web`: fetch a page through Chrome and print it as markdown
//!
//! Page output goes to stdout. Logs and warnings go to stderr, filtered by
//! `RUST_LOG` (default `warn`).

use anyhow::Context;
use std::process::ExitCode;
use webprobe::cli::Invocation;
use webprobe::fetch_page;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let invocation = match Invocation::try_parse_from(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    match run(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(invocation: &Invocation) -> anyhow::Result<()> {
    let url = &invocation.config.url;
    let result = fetch_page(&invocation.config, &invocation.launch).with_context(|| format!("Failed to fetch {}", url))?;

    if invocation.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", json);
    } else {
        println!("{}", result);
    }
    Ok(())
}
