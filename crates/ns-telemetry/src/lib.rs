//! # NS Telemetry
//!
//! Logging and metrics for the NodeSet service mock.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ns_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NS_SERVICE_NAME` | `nodeset-mock` | Service name in logs |
//! | `NS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `NS_JSON_LOGS` | `false` | JSON log lines |
//! | `NS_LOG_TARGET` | `true` | Include event targets |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, StructuredLogger};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, DEPOSIT_DATA_SETS_COMMITTED,
    DEPOSIT_DATA_STORED, EXIT_MESSAGES_STORED, LOGIN_ATTEMPTS, NODES_REGISTERED,
    REQUESTS_REJECTED, SESSIONS_CREATED, SIGNATURES_ISSUED, SNAPSHOTS_HELD, SNAPSHOT_REVERTS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Metrics registration failed
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Configuration could not be applied
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Metrics already registered by an earlier call are left in place.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let logger = init_logging(&config)?;
    let metrics = register_metrics()?;

    Ok(TelemetryGuard {
        _logger: logger,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active for the lifetime of the process.
pub struct TelemetryGuard {
    _logger: StructuredLogger,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}

/// Increment a counter, optionally with label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
