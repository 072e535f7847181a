//! cli::commands
//!
//! Command handlers. Each handler loads configuration through the shared
//! [`Context`], builds what it needs, and reports through `ui::output`.

mod auth;
mod call;
mod completion;
mod post;
mod timeline;

pub use completion::completion;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::{AuthAction, Command};
use super::{Context, TerminalConsent};
use crate::api::{BirdHouse, TimelineQuery};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::secrets;
use crate::ui::prompts;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Auth { action } => match action {
            AuthAction::Login { no_browser } => auth::login(ctx, no_browser),
            AuthAction::Logout => auth::logout(ctx),
            AuthAction::Status => auth::status(ctx),
        },
        Command::Timeline {
            count,
            since_id,
            max_id,
            json,
        } => timeline::timeline(
            ctx,
            &TimelineQuery {
                count,
                since_id,
                max_id,
            },
            json,
        ),
        Command::Post { text } => post::post(ctx, &text),
        Command::Call {
            method,
            url,
            params,
        } => call::call(ctx, method, &url, &params),
        Command::Completion { shell } => completion(shell),
    }
}

/// Build a runtime for one command's async work.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Ask for the consumer secret when it is configured nowhere.
///
/// The value lives only in memory for this invocation.
fn ensure_consumer_secret(ctx: &Context, config: &mut Config) -> Result<()> {
    if config.consumer_key().is_none() || config.consumer_secret().is_some() {
        return Ok(());
    }
    if !ctx.interactive {
        return Ok(());
    }
    let secret =
        prompts::password("Consumer secret: ", true).context("Failed to read consumer secret")?;
    config.set_consumer_secret(secret);
    Ok(())
}

/// Wire the facade from configuration with terminal consent.
fn open_birdhouse(ctx: &Context, open_browser: bool) -> Result<BirdHouse> {
    let mut config = ctx.load_config()?;
    ensure_consumer_secret(ctx, &mut config)?;
    let consent = Arc::new(TerminalConsent::new(open_browser));
    BirdHouse::from_config(&config, consent).context("Failed to set up birdhouse")
}

/// The credential record alone, for commands that never sign requests.
fn open_credential_store(ctx: &Context) -> Result<CredentialStore> {
    let config = ctx.load_config()?;
    let store = secrets::create_store(config.secrets_provider(), config.secrets_directory())
        .context("Failed to initialize secret store")?;
    Ok(CredentialStore::with_record_name(
        Arc::from(store),
        config.record_name(),
    ))
}
