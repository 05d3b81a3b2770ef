//! Observability and diagnostics for the conversion engine.
//!
//! The engine reports data errors as results, not faults, so nothing here ever
//! warns about them. What it does provide is visibility: the `log_metric!`
//! macro emits a structured key/value line for every pause the engine takes,
//! and `enable_verbose_logging` wires the `log` facade to `env_logger` once per
//! process for callers that have no logger of their own.
//!
//! `log_metric!` is compiled out of release builds by `#[cfg(debug_assertions)]`.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

/// The log target every metric line is emitted under.
pub const METRIC_TARGET: &str = "transcode_core::metrics";

/// Logs a structured key-value metric line at debug level, only in debug builds.
///
/// # Example
/// ```
/// use transcode_core::log_metric;
/// let step = 1;
/// log_metric!("event"="pause", "outcome"="undefined_conversion", "step"=&step);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            ::log::debug!(
                target: $crate::observability::METRIC_TARGET,
                "TRANSCODE_METRIC: {{ {} }}",
                parts.join(", ")
            );
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at Info level with a `[LEVEL] message` format.
///
/// When `log_file` is given, lines are appended to that file instead of stderr.
/// Only the first call has any effect; a logger installed by the host
/// application is left alone.
pub fn enable_verbose_logging(log_file: Option<String>) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        let mut open_failure = None;
        if let Some(filename) = log_file {
            match OpenOptions::new().append(true).create(true).open(&filename) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => open_failure = Some((filename, e)),
            }
        }

        if builder.try_init().is_ok() {
            if let Some((filename, e)) = open_failure {
                log::error!("could not open log file {}: {}; logging to stderr", filename, e);
            }
        }
    });
}
