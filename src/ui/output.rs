//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use chrono::DateTime;

use crate::api::Status;

/// Timestamp layout used by the timeline API, e.g.
/// `Wed Aug 27 13:08:45 +0000 2008`.
const API_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Render an API timestamp as `YYYY-MM-DD HH:MM`.
///
/// Values that do not parse are returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_str(raw, API_TIME_FORMAT)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Format one status as a single display line.
pub fn format_status(status: &Status) -> String {
    let mut line = String::new();
    if !status.created_at.is_empty() {
        line.push_str(&format_timestamp(&status.created_at));
        line.push(' ');
    }
    let author = status.author();
    if !author.is_empty() {
        line.push_str(&author);
        line.push_str(": ");
    }
    line.push_str(&status.text.replace('\n', " "));
    line
}

/// Format a timeline, one status per line.
pub fn format_timeline(statuses: &[Status]) -> String {
    let lines: Vec<String> = statuses.iter().map(format_status).collect();
    format_list(&lines, "")
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
