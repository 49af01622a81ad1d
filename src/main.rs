use dotenvy::dotenv;
use eraport::logging::init_tracing;
use eraport::metrics::{init_metrics, metrics_app};
use eraport::router::init_router;
use eraport::state::AppState;
use eraport_config::ServerConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics() {
        let metrics_address = server_config.metrics_bind_address();
        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&metrics_address).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!(error = %e, address = %metrics_address, "metrics listener failed to bind");
                    return;
                }
            };
            info!("Metrics available at http://{}/metrics", metrics_address);
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "metrics server stopped");
            }
        });
    }

    let pool = eraport_db::init_db_pool().await;
    eraport_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let state = AppState::with_pool(pool);
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind server address");
    info!("Server running on http://{}", address);
    info!("Scalar UI available at http://{}/scalar", address);
    axum::serve(listener, app).await.expect("Server error");
}
