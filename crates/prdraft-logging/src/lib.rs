//! # prdraft-logging
//!
//! Logging for the prdraft pull-request description generator.
//!
//! Two layers live here:
//!
//! - [`init_tracing`] installs the process-wide `tracing` subscriber used for
//!   low-level diagnostics (`debug!`, `trace!`).
//! - [`Logger`] is an explicitly constructed component that renders the
//!   run's user-facing progress events. It is created once in `main` and
//!   passed to the patch extractor and the pipeline; nothing reaches for a
//!   global logger.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//! - [`BaseSource`] - How the base branch was chosen
//!
//! All console output goes to stderr so stdout only carries the generated
//! description.

mod events;

pub use events::{BaseSource, LogEvent, LogFormat, Logger};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
