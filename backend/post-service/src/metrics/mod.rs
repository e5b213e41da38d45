/// Prometheus metrics for post-service.
///
/// Exposes geocoding and like collectors and an HTTP handler for the `/metrics` endpoint.
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Geocoding provider calls by direction (forward/reverse) and outcome
    /// (resolved/no_match/unavailable/timed_out).
    pub static ref GEOCODING_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "geocoding_requests_total",
        "Geocoding provider calls segmented by direction and outcome",
        &["direction", "outcome"]
    )
    .expect("failed to register geocoding_requests_total");

    /// Like registry operations by action (add/remove) and result (ok/conflict/not_found/error).
    pub static ref LIKE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "like_operations_total",
        "Like operations segmented by action and result",
        &["action", "result"]
    )
    .expect("failed to register like_operations_total");
}

pub fn record_geocoding(direction: &str, outcome: &str) {
    GEOCODING_REQUESTS_TOTAL
        .with_label_values(&[direction, outcome])
        .inc();
}

pub fn record_like_operation(action: &str, result: &str) {
    LIKE_OPERATIONS_TOTAL
        .with_label_values(&[action, result])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
