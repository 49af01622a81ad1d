use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// `OBSERVABILITY_ENABLED=false` (or `0`) turns every recorder below into a no-op.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `None` when observability is disabled.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )
        .expect("Failed to set buckets")
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();
    let status_str = status.to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status_str).increment(1);

    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for metrics server
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

/// A subject or page fetch failed and the aggregation continued without it.
pub fn track_fetch_failure(scope: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("aggregation_fetch_failures_total", "scope" => scope).increment(1);
}

/// Subjects classified as `Duplicate` in a completion report.
pub fn track_duplicates_detected(subjects: usize) {
    if !is_observability_enabled() || subjects == 0 {
        return;
    }
    counter!("grade_duplicates_detected_total").increment(subjects as u64);
}

pub fn track_duplicates_cleaned(records: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("grade_duplicates_cleaned_total").increment(records as u64);
}

/// Pages read by one attendance aggregation.
pub fn track_attendance_pages(pages: usize, complete: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if complete { "complete" } else { "partial" };
    counter!("attendance_pages_read_total", "status" => status).increment(pages as u64);
    histogram!("attendance_pages_per_report").record(pages as f64);
}

pub fn track_grade_saved(derived_description: bool) {
    if !is_observability_enabled() {
        return;
    }
    let description = if derived_description { "derived" } else { "manual" };
    counter!("grades_saved_total", "description" => description).increment(1);
}

pub fn track_attendance_recorded(status: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("attendance_recorded_total", "status" => status).increment(1);
}

pub fn track_period_activated() {
    if !is_observability_enabled() {
        return;
    }
    counter!("period_transitions_total").increment(1);
}

/// Period context served from cache (`hit`) or resolved from the store.
pub fn track_period_cache(hit: bool) {
    if !is_observability_enabled() {
        return;
    }
    let outcome = if hit { "hit" } else { "miss" };
    counter!("period_cache_lookups_total", "outcome" => outcome).increment(1);
}
