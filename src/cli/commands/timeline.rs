//! timeline command - Show the home timeline

use anyhow::{Context as _, Result};

use super::{open_birdhouse, runtime};
use crate::api::TimelineQuery;
use crate::cli::Context;
use crate::ui::output;

/// Fetch and print the home timeline.
pub fn timeline(ctx: &Context, query: &TimelineQuery, json: bool) -> Result<()> {
    let mut birdhouse = open_birdhouse(ctx, true)?;
    let statuses = runtime()?
        .block_on(birdhouse.get_timeline(query))
        .context("Failed to fetch timeline")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else if statuses.is_empty() {
        output::print("No statuses.", ctx.verbosity());
    } else {
        println!("{}", output::format_timeline(&statuses));
    }
    Ok(())
}
