//! Telemetry initialisation for the `aesgcm` command.
//!
//! Structured JSON logs go to stderr: stdout carries the key, envelope or
//! plaintext, and a log line there would corrupt what the caller pipes on.
//! Fields are limited to operation names and byte lengths.

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber on stderr as the global default.
///
/// `RUST_LOG` takes precedence over `log_level` when set.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    subscriber(filter, std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise aesgcm tracing subscriber: {e}"))
}

/// JSON subscriber writing through `make_writer`; each line carries the
/// current `command` span with its `op` field.
pub(crate) fn subscriber<W>(
    filter: EnvFilter,
    make_writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .finish()
}
