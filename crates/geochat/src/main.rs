//! An interactive GeoChat session in the terminal.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use geochat::Settings;
use geochat::core::location::{FixedLocation, NoLocation};
use geochat::core::{ChatBuilder, LocationProvider, SubmitError};
use geochat::render::{render_location_status, render_message};
use geochat_gemini_model::GeminiProvider;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = match Settings::from_vars(|name| env::var(name).ok()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("starting with {settings:?}");

    let location = match settings.location() {
        Some(coords) => LocationProvider::spawn(FixedLocation(coords)),
        None => LocationProvider::spawn(NoLocation),
    };
    let model_provider = GeminiProvider::new(settings.gemini_config());

    let mut chat = ChatBuilder::with_model_provider(model_provider)
        .with_location(location.clone())
        .build();

    println!("{}", "GeoChat".bold());
    println!("{}", render_location_status(&location.wait_settled().await));
    println!();
    for msg in chat.messages() {
        print!("{}", render_message(msg));
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let mut input = BufReader::new(io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut input).await else {
            break;
        };

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🗺️  Checking maps...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let result = chat.submit(&line).await;

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();

        match result {
            Ok(msg) => {
                println!();
                print!("{}", render_message(msg));
                println!();
            }
            Err(SubmitError::EmptyInput) => continue,
            Err(err) => warn!("submission rejected: {err}"),
        }
    }
}

/// Reads the next non-blank line, or `None` at end of input.
async fn read_line<R>(input: &mut Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match input.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(line) => return line,
            Err(err) => {
                error!("error reading input: {err}");
                return None;
            }
        }
    }
}
