//! call command - Raw signed API call

use anyhow::{Context as _, Result};

use super::{open_birdhouse, runtime};
use crate::cli::Context;
use crate::transport::HttpMethod;

/// Sign and send one request, printing the response body.
pub fn call(
    ctx: &Context,
    method: HttpMethod,
    url: &str,
    params: &[(String, String)],
) -> Result<()> {
    let mut birdhouse = open_birdhouse(ctx, true)?;
    let response = runtime()?
        .block_on(birdhouse.call(url, method, params))
        .with_context(|| format!("{} {} failed", method, url))?;

    println!("{}", response.body);
    Ok(())
}
