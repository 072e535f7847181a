//! birdhouse binary entry point.

use birdhouse::cli::{self, Cli};
use birdhouse::ui::output;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `birdhouse=debug`.
const LOG_ENV: &str = "BIRDHOUSE_LOG";

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("warn,birdhouse=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    if let Err(e) = cli::run(cli) {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
