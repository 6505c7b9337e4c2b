//! Prometheus metrics setup and metric definitions

use crate::domain::{DeliveryResult, TriggerSource};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const DELIVERIES_TOTAL: &str = "quicknotify_deliveries_total";
pub const DELIVERY_DURATION_SECONDS: &str = "quicknotify_delivery_duration_seconds";
pub const RETRIES_TOTAL: &str = "quicknotify_delivery_retries_total";
pub const PROBES_TOTAL: &str = "quicknotify_smtp_probes_total";

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    // SMTP exchanges take from well under a second up to the profile timeout
    let buckets = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()?;
    Ok(handle)
}

/// Register metric descriptions and emit initial zero values so Prometheus output
/// includes HELP/TYPE lines for all metrics from startup.
pub fn describe_metrics() {
    describe_counter!(DELIVERIES_TOTAL, "Delivery attempts by trigger source and result");
    describe_histogram!(
        DELIVERY_DURATION_SECONDS,
        "Time spent in the SMTP exchange per delivery attempt"
    );
    describe_counter!(RETRIES_TOTAL, "Manual retries of failed deliveries by result");
    describe_counter!(PROBES_TOTAL, "SMTP connection tests by result");

    for result in ["success", "failed"] {
        counter!(RETRIES_TOTAL, "result" => result).absolute(0);
        counter!(PROBES_TOTAL, "result" => result).absolute(0);
    }
}

fn result_label(result: &DeliveryResult) -> &'static str {
    if result.success {
        "success"
    } else {
        "failed"
    }
}

/// Count one send attempt that reached the transport
pub fn record_delivery(trigger: TriggerSource, result: &DeliveryResult) {
    counter!(
        DELIVERIES_TOTAL,
        "trigger" => trigger.as_str(),
        "result" => result_label(result)
    )
    .increment(1);
    histogram!(DELIVERY_DURATION_SECONDS).record(result.duration_seconds as f64);
}

pub fn record_retry(result: &DeliveryResult) {
    counter!(RETRIES_TOTAL, "result" => result_label(result)).increment(1);
    histogram!(DELIVERY_DURATION_SECONDS).record(result.duration_seconds as f64);
}

pub fn record_probe(result: &DeliveryResult) {
    counter!(PROBES_TOTAL, "result" => result_label(result)).increment(1);
}
