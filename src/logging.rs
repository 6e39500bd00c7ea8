//! Logger setup for the headless runner

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset
///
/// `--verbose` only raises this crate to `debug`; the per-event `trace`
/// lines from the event bus stay behind an explicit `RUST_LOG`.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,infinite_climber=debug"
    } else {
        "info"
    }
}

/// Install env_logger without timestamps so seeded runs diff cleanly
pub fn init(verbose: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter(verbose)));
    builder.format_timestamp(None);
    // A second call finds the logger already installed
    let _ = builder.try_init();
}
