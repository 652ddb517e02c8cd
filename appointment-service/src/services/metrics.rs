//! Metrics collection for appointment-service.

use crate::models::Recipient;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the process-wide Prometheus recorder. Later calls are ignored.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one outbound send attempt.
pub fn record_notification(recipient: Recipient, status: &'static str) {
    counter!(
        "appointment_notifications_total",
        "recipient" => recipient.as_str(),
        "status" => status
    )
    .increment(1);
}

/// Record the outcome of a booking request: `booked`, `invalid` or `failed`.
pub fn record_booking(outcome: &'static str) {
    counter!("appointment_bookings_total", "outcome" => outcome).increment(1);
}
