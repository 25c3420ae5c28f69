use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `filter` is an `EnvFilter` directive
/// already resolved from `LOG_LEVEL`/`RUST_LOG`; an unparsable one falls
/// back to `info`.
pub fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
