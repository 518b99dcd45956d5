//! Prometheus metrics for the service mock.
//!
//! All metrics follow the naming convention: `ns_mock_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // AUTH METRICS
    // =========================================================================

    /// Sessions minted by `create_session`
    pub static ref SESSIONS_CREATED: Counter = Counter::new(
        "ns_mock_auth_sessions_created_total",
        "Total number of login sessions created"
    ).expect("metric creation failed");

    /// Login attempts by outcome
    pub static ref LOGIN_ATTEMPTS: CounterVec = CounterVec::new(
        Opts::new("ns_mock_auth_login_attempts_total", "Login attempts by outcome"),
        &["outcome"]  // outcome: success/failure
    ).expect("metric creation failed");

    /// Node registrations completed
    pub static ref NODES_REGISTERED: Counter = Counter::new(
        "ns_mock_auth_nodes_registered_total",
        "Total number of nodes registered"
    ).expect("metric creation failed");

    // =========================================================================
    // SIGNATURE METRICS
    // =========================================================================

    /// Signatures issued by kind
    pub static ref SIGNATURES_ISSUED: CounterVec = CounterVec::new(
        Opts::new("ns_mock_signatures_issued_total", "Signatures issued by kind"),
        &["kind"]  // kind: whitelist/minipool_deposit
    ).expect("metric creation failed");

    // =========================================================================
    // LIFECYCLE METRICS
    // =========================================================================

    /// Deposit records accepted (duplicates excluded)
    pub static ref DEPOSIT_DATA_STORED: Counter = Counter::new(
        "ns_mock_deposit_data_stored_total",
        "Total number of new deposit records stored"
    ).expect("metric creation failed");

    /// Deposit-data sets committed to vaults
    pub static ref DEPOSIT_DATA_SETS_COMMITTED: Counter = Counter::new(
        "ns_mock_deposit_data_sets_committed_total",
        "Total number of deposit-data sets committed"
    ).expect("metric creation failed");

    /// Exit messages accepted by module
    pub static ref EXIT_MESSAGES_STORED: CounterVec = CounterVec::new(
        Opts::new("ns_mock_exit_messages_stored_total", "Exit messages stored by module"),
        &["module"]  // module: stakewise/constellation
    ).expect("metric creation failed");

    // =========================================================================
    // STORE METRICS
    // =========================================================================

    /// Named snapshots currently held
    pub static ref SNAPSHOTS_HELD: Gauge = Gauge::new(
        "ns_mock_store_snapshots",
        "Number of named snapshots currently held"
    ).expect("metric creation failed");

    /// Reverts performed
    pub static ref SNAPSHOT_REVERTS: Counter = Counter::new(
        "ns_mock_store_reverts_total",
        "Total number of snapshot reverts"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Rejected requests by wire error key
    pub static ref REQUESTS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("ns_mock_requests_rejected_total", "Rejected requests by error key"),
        &["error_key"]
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
#[derive(Debug)]
pub struct MetricsHandle {
    /// Number of collectors registered
    pub collectors: usize,
}

/// Register all metrics with the global registry.
///
/// Collectors registered by an earlier call are kept as they are.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Auth
        Box::new(SESSIONS_CREATED.clone()),
        Box::new(LOGIN_ATTEMPTS.clone()),
        Box::new(NODES_REGISTERED.clone()),
        // Signatures
        Box::new(SIGNATURES_ISSUED.clone()),
        // Lifecycle
        Box::new(DEPOSIT_DATA_STORED.clone()),
        Box::new(DEPOSIT_DATA_SETS_COMMITTED.clone()),
        Box::new(EXIT_MESSAGES_STORED.clone()),
        // Store
        Box::new(SNAPSHOTS_HELD.clone()),
        Box::new(SNAPSHOT_REVERTS.clone()),
        // Errors
        Box::new(REQUESTS_REJECTED.clone()),
    ];

    let collectors = metrics.len();
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { collectors })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
