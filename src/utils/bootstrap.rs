//! Bootstrap utilities.
//!
//! Shared initialization for binaries that embed the dispatcher.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LOG_ENV_VAR;

/// Filter used when `SX_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Build the log filter from `SX_LOG`, falling back to "info".
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initialize tracing with the SX_LOG environment variable.
///
/// Defaults to "info" level if SX_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_filter_defaults_to_info() {
        std::env::remove_var(LOG_ENV_VAR);
        assert_eq!(env_filter().to_string(), "info");
    }

    #[test]
    #[serial]
    fn test_env_filter_reads_sx_log() {
        std::env::set_var(LOG_ENV_VAR, "sx_actions=debug");
        let filter = env_filter();
        std::env::remove_var(LOG_ENV_VAR);
        assert_eq!(filter.to_string(), "sx_actions=debug");
    }
}
