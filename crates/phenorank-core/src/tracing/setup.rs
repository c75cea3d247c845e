//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "PHENORANK_LOG";

/// Default filter when `PHENORANK_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the phenorank tracing/logging system.
///
/// Reads `PHENORANK_LOG` for per-crate log levels.
/// Format: `PHENORANK_LOG=phenorank_tables=debug,phenorank_enrich=warn`
///
/// Idempotent: only the first call installs a subscriber. A subscriber
/// installed elsewhere first is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init();
    });
}
