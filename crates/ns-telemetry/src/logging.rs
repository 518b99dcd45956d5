//! Structured logging setup.
//!
//! Every crate in the workspace logs through `tracing`; this module owns the
//! one global subscriber. Plain output is meant for local runs, JSON for log
//! collectors.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, EnvFilter};

/// Handle returned by [`init_logging`].
#[derive(Debug)]
pub struct StructuredLogger {
    /// False when another subscriber was already installed
    pub installed: bool,
}

/// Install the global `tracing` subscriber.
///
/// Calling this more than once is not an error: test binaries initialize
/// logging from many tests, and only the first call wins.
pub fn init_logging(config: &TelemetryConfig) -> Result<StructuredLogger, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {e}", config.log_level)))?;

    let installed = if config.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .with_current_span(true)
            .try_init()
            .is_ok()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(
            service = %config.service_name,
            json_logs = config.json_logs,
            "Structured logging configured"
        );
    }

    Ok(StructuredLogger { installed })
}

/// Log a request rejection with its wire error key.
#[macro_export]
macro_rules! log_rejection {
    ($operation:expr, $error_key:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            operation = $operation,
            error_key = $error_key,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a node-scoped event with the node address as a field.
#[macro_export]
macro_rules! log_node_event {
    ($level:ident, $msg:expr, $node:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            node = %$node,
            $($($field)*,)?
            $msg
        )
    };
}
