//! Acquisition metrics.
//!
//! Counters for every resolver and relay attempt plus whole-pipeline
//! outcomes. No exporter is installed here; the host process decides.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Resolver attempts by backend and outcome.
    pub const RESOLVER_ATTEMPTS_TOTAL: &str = "tldw_resolver_attempts_total";

    /// Download attempts by relay (or "direct") and outcome.
    pub const RELAY_ATTEMPTS_TOTAL: &str = "tldw_relay_attempts_total";

    /// Completed acquisitions by reference kind and outcome.
    pub const ACQUISITIONS_TOTAL: &str = "tldw_acquisitions_total";

    /// Size of downloaded blobs.
    pub const DOWNLOAD_BYTES: &str = "tldw_download_bytes";
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record one resolver backend attempt.
pub fn record_resolver_attempt(backend: &str, success: bool) {
    counter!(
        names::RESOLVER_ATTEMPTS_TOTAL,
        "backend" => backend.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Record one download attempt through a relay or the direct path.
pub fn record_relay_attempt(relay: &str, success: bool) {
    counter!(
        names::RELAY_ATTEMPTS_TOTAL,
        "relay" => relay.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Record a finished acquisition.
pub fn record_acquisition(kind: &str, success: bool, bytes: Option<usize>) {
    counter!(
        names::ACQUISITIONS_TOTAL,
        "kind" => kind.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);

    if let Some(bytes) = bytes {
        histogram!(names::DOWNLOAD_BYTES).record(bytes as f64);
    }
}
