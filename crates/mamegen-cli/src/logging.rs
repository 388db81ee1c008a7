use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Initialise stderr logging, filtered by `RUST_LOG` (default: warn).
///
/// Initialisation failure is ignored so embedding callers that already
/// installed a subscriber keep theirs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
