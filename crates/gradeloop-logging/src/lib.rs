//! # gradeloop-logging
//!
//! Event logging for the draft/grade/improve loop. Each cycle emits a
//! [`LogEvent`] through a [`Logger`], which renders it to the console in the
//! chosen [`LogFormat`] and appends it as a JSONL line when a log file is
//! configured. [`init_tracing`] wires up the `tracing` subscriber for the
//! diagnostic output the other crates emit.

mod events;

pub use events::{LogEvent, LogFormat, Logger};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing, honoring `RUST_LOG` when set.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Compact => {
            registry
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().with_target(false)).init();
        }
    }
}
