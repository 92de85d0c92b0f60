// tracing setup for the binary
//
// RUST_LOG wins, then the configured filter, then "warn". Output goes to
// stderr so it never mixes with command output.

use std::io::IsTerminal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init_tracing(configured: Option<&str>, verbose: bool) {
    let fallback = if verbose {
        "tododemo=debug,tododemo_lib=debug"
    } else {
        configured.unwrap_or(DEFAULT_FILTER)
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
}
