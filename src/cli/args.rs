//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this configuration file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal, machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::transport::HttpMethod;

/// Birdhouse - OAuth 1.0a authorization and signed calls for a timeline API
#[derive(Parser, Debug)]
#[command(name = "birdhouse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: $BIRDHOUSE_CONFIG or ~/.birdhouse/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; disables prompts
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive prompts are allowed.
    ///
    /// True unless `--quiet` was set or stdin is not a terminal.
    pub fn interactive(&self) -> bool {
        !self.quiet && crate::ui::prompts::is_interactive()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authorize, deauthorize, or inspect the stored access token
    #[command(
        name = "auth",
        long_about = "Manage authorization with the timeline API.\n\n\
            Birdhouse uses the OAuth 1.0a three-legged flow. 'login' obtains a \
            request token, sends you to the provider's authorization page, and \
            exchanges the verifier for an access token that is stored locally.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Authorize (opens browser automatically)
    birdhouse auth login

    # Authorize without opening a browser
    birdhouse auth login --no-browser

    # Check whether an access token is stored
    birdhouse auth status

    # Remove the stored access token
    birdhouse auth logout

HOW IT WORKS:
    1. Run 'birdhouse auth login' to fetch a request token
    2. Your browser opens to the provider's authorization page
    3. Approve the application
    4. Paste the redirect URL or the PIN shown by the provider
    5. The access token is saved and used for every later call"
    )]
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show the home timeline
    #[command(
        name = "timeline",
        after_help = "\
WORKFLOW EXAMPLES:
    # Latest statuses
    birdhouse timeline

    # Twenty statuses newer than a known id, as JSON
    birdhouse timeline --count 20 --since-id 1050118621198921728 --json"
    )]
    Timeline {
        /// Number of statuses to request
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=200))]
        count: Option<u32>,

        /// Only statuses newer than this id
        #[arg(long, value_name = "ID")]
        since_id: Option<String>,

        /// Only statuses older than or equal to this id
        #[arg(long, value_name = "ID")]
        max_id: Option<String>,

        /// Print the statuses as JSON
        #[arg(long)]
        json: bool,
    },

    /// Post a status
    #[command(name = "post")]
    Post {
        /// Status text
        text: String,
    },

    /// Make a raw signed API call and print the response body
    #[command(
        name = "call",
        after_help = "\
WORKFLOW EXAMPLES:
    # Signed GET with query parameters
    birdhouse call GET https://api.twitter.com/1.1/statuses/user_timeline.json -p screen_name=twitterapi -p count=2

    # Signed POST with form parameters
    birdhouse call POST https://api.twitter.com/1.1/statuses/update.json -p status=hello"
    )]
    Call {
        /// HTTP method (GET or POST)
        method: HttpMethod,

        /// Absolute API URL
        url: String,

        /// Request parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    birdhouse completion bash > ~/.local/share/bash-completion/completions/birdhouse

    # Zsh
    birdhouse completion zsh > ~/.zfunc/_birdhouse

    # Fish
    birdhouse completion fish > ~/.config/fish/completions/birdhouse.fish

    # PowerShell
    birdhouse completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Authorization subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Run the authorization handshake
    Login {
        /// Do not attempt to open browser automatically
        #[arg(long)]
        no_browser: bool,
    },
    /// Remove the stored access token
    Logout,
    /// Show whether an access token is stored
    Status,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Parse a `key=value` parameter. The value may be empty or contain `=`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
