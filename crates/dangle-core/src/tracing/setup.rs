//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "DANGLE_LOG";

/// Initialize the dangle tracing/logging system.
///
/// Reads `DANGLE_LOG` for per-module log levels.
/// Format: `DANGLE_LOG=dangle_analysis::checks=trace,dangle_analysis::symbols=debug`
///
/// Falls back to `dangle=info` if `DANGLE_LOG` is not set or is invalid.
///
/// Idempotent: only the first call installs a subscriber. If another
/// subscriber is already installed globally, that one is kept.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("dangle=info"));

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
