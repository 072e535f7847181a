//! post command - Post a status

use anyhow::{Context as _, Result};

use super::{open_birdhouse, runtime};
use crate::api::types::validate_status_text;
use crate::cli::Context;
use crate::ui::output;

pub fn post(ctx: &Context, text: &str) -> Result<()> {
    // Reject bad text before touching config or the network.
    validate_status_text(text)?;

    let mut birdhouse = open_birdhouse(ctx, true)?;
    let status = runtime()?
        .block_on(birdhouse.post_status(text))
        .context("Failed to post status")?;

    if ctx.quiet {
        println!("{}", status.id_str);
    } else {
        output::success(format!("Posted {}", output::format_status(&status)), ctx.verbosity());
    }
    Ok(())
}
