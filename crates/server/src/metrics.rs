//! Prometheus metrics

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::state::AppState;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder
///
/// Must be called once at startup before recording any metrics.
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    register_default_metrics();

    METRICS_HANDLE.get_or_init(|| handle.clone());
    handle
}

fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Register default application metrics
fn register_default_metrics() {
    gauge!("stellar_voice_sessions_active").set(0.0);
    counter!("stellar_voice_sessions_total").absolute(0);
    counter!("stellar_voice_sessions_rejected_total").absolute(0);

    counter!("stellar_voice_turns_total", "intent" => "general-chat").absolute(0);
    counter!("stellar_voice_turns_total", "intent" => "story-request").absolute(0);
    counter!("stellar_voice_turns_total", "intent" => "fact-lookup").absolute(0);

    histogram!("stellar_voice_turn_duration_seconds").record(0.0);

    counter!("stellar_voice_errors_total", "stage" => "ingress").absolute(0);
    counter!("stellar_voice_errors_total", "stage" => "generation").absolute(0);
    counter!("stellar_voice_errors_total", "stage" => "synthesis").absolute(0);
}

pub fn record_session_started() {
    counter!("stellar_voice_sessions_total").increment(1);
}

pub fn record_session_rejected() {
    counter!("stellar_voice_sessions_rejected_total").increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("stellar_voice_sessions_active").set(count as f64);
}

pub fn record_turn_duration(duration_secs: f64) {
    histogram!("stellar_voice_turn_duration_seconds").record(duration_secs);
}

pub fn record_error(stage: &'static str) {
    counter!("stellar_voice_errors_total", "stage" => stage).increment(1);
}

/// Metrics endpoint handler, Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    record_active_sessions(state.session_count());

    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helpers() {
        // These should not panic even without a recorder installed.
        record_session_started();
        record_session_rejected();
        record_active_sessions(2);
        record_turn_duration(0.8);
        record_error("generation");
    }
}
