//! cli::commands::auth
//!
//! Authorization commands.
//!
//! # Design
//!
//! - Tokens and secrets are NEVER printed to stdout/stderr
//! - `--quiet` switches to machine-readable one-word output
//!
//! # Example
//!
//! ```bash
//! birdhouse auth login
//! birdhouse auth status
//! birdhouse auth logout
//! ```

use anyhow::{Context as _, Result};

use super::{open_birdhouse, open_credential_store, runtime};
use crate::auth::AuthStatus;
use crate::cli::Context;
use crate::ui::output;

/// Run the handshake unless an access token is already stored.
pub fn login(ctx: &Context, no_browser: bool) -> Result<()> {
    let mut birdhouse = open_birdhouse(ctx, !no_browser)?;
    let status = runtime()?
        .block_on(birdhouse.authorize())
        .context("Authorization failed")?;

    if ctx.quiet {
        println!("authorized");
        return Ok(());
    }

    let who = birdhouse
        .screen_name()
        .map(|name| format!(" as @{}", name))
        .unwrap_or_default();
    match status {
        AuthStatus::Authorized => {
            output::success(format!("Authorized{}.", who), ctx.verbosity())
        }
        AuthStatus::AlreadyAuthorized => output::print(
            "Already authorized. Run 'birdhouse auth logout' to switch accounts.",
            ctx.verbosity(),
        ),
    }
    Ok(())
}

/// Remove the stored access token.
pub fn logout(ctx: &Context) -> Result<()> {
    let store = open_credential_store(ctx)?;
    let had_token = store.load().is_some();
    store.clear().context("Failed to remove stored access token")?;

    if had_token {
        output::success("Logged out.", ctx.verbosity());
    } else {
        output::print("Not logged in.", ctx.verbosity());
    }
    Ok(())
}

/// Report whether an access token is stored.
pub fn status(ctx: &Context) -> Result<()> {
    let store = open_credential_store(ctx)?;
    let authorized = store.load().is_some();

    if ctx.quiet {
        println!("{}", if authorized { "authorized" } else { "not_authorized" });
    } else if authorized {
        println!("Authorized.");
        // The token itself is never shown.
    } else {
        println!("Not authorized.");
        println!("Run 'birdhouse auth login' to authorize.");
    }
    Ok(())
}
