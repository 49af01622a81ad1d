use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const LOG_DIR: &str = "storage/logs";

/// Reuses the gateway's request id when present so log lines can be joined.
fn request_id_for(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = request_id_for(&req);

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %matched_path,
    );

    let mut response = async move {
        info!("Incoming request");
        let response = next.run(req).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        match status {
            400..=499 => warn!(status, latency_ms, "Client error"),
            500..=599 => error!(status, latency_ms, "Server error"),
            _ => info!(status, latency_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Default filter: `LOG_LEVEL` for the e-raport crates, quieter for the stack below.
fn default_filter() -> EnvFilter {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    EnvFilter::new(format!(
        "{krate}={level},eraport_core={level},eraport_db={level},tower_http=warn,sqlx=warn,axum::rejection=trace",
        krate = env!("CARGO_CRATE_NAME"),
    ))
}

/// Installs console, error-file and JSON-file layers.
///
/// Files rotate daily under `storage/logs`; `RUST_LOG` overrides the console filter.
pub fn init_tracing() {
    use std::fs;
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    fs::create_dir_all(LOG_DIR).expect("Failed to create logs directory");

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "eraport.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("warn"));

    // Structured logs for ingestion (Loki, etc.)
    let json_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "eraport.json");

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(default_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    info!("Tracing initialized with console and file logging");
}
