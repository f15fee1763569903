//! Terminal rendering of the transcript, citation cards and the location
//! indicator.
//!
//! Message text is printed as-is; markdown is left for the terminal
//! reader.

use std::fmt::Write as _;

use chrono::{Local, TimeZone};
use geochat_core::location::LocationStatus;
use geochat_core::Message;
use geochat_model::{GroundingChunk, MapPlace, Role, WebSource};
use owo_colors::OwoColorize;

/// The bar drawn in front of every message line.
pub const BAR_CHAR: &str = "▎";

/// Renders one message with its citation cards.
pub fn render_message(msg: &Message) -> String {
    let mut out = String::new();
    let time = format_time(msg.timestamp());

    match msg.role() {
        Role::User => {
            let bar = BAR_CHAR.bright_blue();
            for line in msg.text().lines() {
                writeln!(out, "{bar}🧑 {}", line.bright_white()).ok();
            }
            writeln!(out, "{bar}{}", time.dimmed()).ok();
        }
        Role::Model => {
            let bar = BAR_CHAR.bright_green();
            let mut lines = msg.text().lines();
            if let Some(first) = lines.next() {
                writeln!(out, "{bar}🤖 {}", first.bright_white()).ok();
            }
            for line in lines {
                writeln!(out, "{bar}   {}", line.bright_white()).ok();
            }
            for chunk in msg.grounding_chunks().unwrap_or_default() {
                out.push_str(&render_card(chunk));
            }
            writeln!(out, "{bar}{}", time.dimmed()).ok();
        }
    }

    out
}

/// Renders a citation card.
pub fn render_card(chunk: &GroundingChunk) -> String {
    match chunk {
        GroundingChunk::Map(place) => render_map_card(place),
        GroundingChunk::Web(source) => render_web_card(source),
    }
}

fn render_map_card(place: &MapPlace) -> String {
    let bar = BAR_CHAR.bright_green();
    let mut out = String::new();
    writeln!(out, "{bar}   📍 {}", place.title.bold()).ok();
    writeln!(out, "{bar}      {}", "Location result".dimmed()).ok();
    if let Some(review) = place.review_snippets.first() {
        writeln!(
            out,
            "{bar}      {} {}",
            "★".yellow(),
            format!("\"{}\"", review.snippet).italic()
        )
        .ok();
    }
    writeln!(
        out,
        "{bar}      View on Google Maps: {}",
        place.uri.bright_blue().underline()
    )
    .ok();
    out
}

fn render_web_card(source: &WebSource) -> String {
    let bar = BAR_CHAR.bright_green();
    let mut out = String::new();
    writeln!(out, "{bar}   🔎 {}", source.title.bold()).ok();
    writeln!(out, "{bar}      {}", "Web Source".dimmed()).ok();
    writeln!(
        out,
        "{bar}      Read Article: {}",
        source.uri.bright_green().underline()
    )
    .ok();
    out
}

/// Renders the location indicator, with the advisory when the location
/// is unavailable.
pub fn render_location_status(status: &LocationStatus) -> String {
    match status {
        LocationStatus::Active(_) => {
            format!("🧭 {}", status.indicator().bright_green())
        }
        LocationStatus::Acquiring => {
            format!("⚠️  {}", status.indicator().yellow())
        }
        LocationStatus::Unavailable(err) => {
            format!(
                "⚠️  {} {}",
                status.indicator().yellow(),
                err.advisory().dimmed()
            )
        }
    }
}

/// Formats an epoch-milliseconds timestamp as local `HH:MM`.
pub fn format_time(timestamp: i64) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(time) => time.format("%H:%M").to_string(),
        None => String::new(),
    }
}
