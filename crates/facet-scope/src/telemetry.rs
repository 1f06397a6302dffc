use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Install the global fmt subscriber. `RUST_LOG` overrides the configured
/// filter. Returns `false` if a subscriber was already installed.
pub fn init(config: &TelemetryConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}
