//! cli
//!
//! Command-line interface layer for Birdhouse.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and wire the production capabilities
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and calls the
//! [`crate::api::BirdHouse`] facade; authorization state lives there.

pub mod args;
pub mod commands;
pub mod consent;

pub use args::{Cli, Shell};
pub use consent::TerminalConsent;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::ui::output::Verbosity;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit `--config` path
    pub config_path: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
    /// Whether prompts may be shown
    pub interactive: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load configuration honoring `--config`.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref()).context("Failed to load configuration")
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`, after logging is set
/// up from the parsed flags.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        config_path: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };

    commands::dispatch(cli.command, &ctx)
}
