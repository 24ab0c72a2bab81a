//! Tracing subscriber initialization
//!
//! Logs go to stderr so they never interleave with answers on stdout.
//! `RUST_LOG` wins when set; otherwise the CLI verbosity picks the level.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbosity: Verbosity) -> String {
    let level = verbosity.log_level();
    // Dependencies stay at warn unless asked for explicitly
    format!("warn,mlchat={}", level)
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(verbosity: Verbosity) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity)))?;

    let span_events = if verbosity == Verbosity::VeryVerbose {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
