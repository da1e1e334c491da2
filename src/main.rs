use anyhow::Context;
use dotenvy::dotenv;
use shipwreck::logging::{init_tracing, shutdown_tracer};
use shipwreck::metrics::{init_metrics, metrics_app};
use shipwreck::router::init_router;
use shipwreck::state::init_app_state;
use shipwreck_config::{ObservabilityConfig, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let observability = ObservabilityConfig::from_env();
    init_tracing(&observability).context("failed to initialize logging")?;

    let server = ServerConfig::from_env();

    if let Some(handle) = init_metrics(&observability).context("failed to install metrics recorder")? {
        let metrics_addr = server.metrics_addr()?;
        let listener = tokio::net::TcpListener::bind(metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
        info!("Metrics available at http://{}/metrics", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let state = init_app_state().await?;
    info!(
        dialect = %state.db.dialect(),
        model = %state.agent.model_name(),
        "Application state ready"
    );
    let app = init_router(state.clone());

    let api_addr = server.api_addr()?;
    let listener = tokio::net::TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("failed to bind {api_addr}"))?;
    info!("Server running on http://{}", api_addr);
    info!("Swagger UI available at http://{}/swagger-ui", api_addr);
    info!("Scalar UI available at http://{}/scalar", api_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.db.close().await;
    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
