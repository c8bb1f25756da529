//! Process-global tracing setup: `EnvFilter` + JSON stdout logs.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install the global subscriber. Filter comes from `RUST_LOG` and defaults
/// to `info`. Call once from `main`, before any request is served.
pub fn init_global_from_env() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .try_init()
        .map_err(|e| Error::TelemetryInit(format!("tracing already initialized: {e}")))?;

    Ok(())
}
