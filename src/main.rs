use anyhow::Context;
use census::census_config::{DatabaseConfig, JwtConfig, ServerConfig};
use census::logging::{init_tracing, shutdown_tracer};
use census::router::init_router;
use census::state::init_app_state;
use census::utils::tracing::Tracer;
use dotenvy::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let tracer = Tracer::new(init_tracing()?);

    let server_config = ServerConfig::from_env();
    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let jwt_config = JwtConfig::from_env();
    if !jwt_config.is_configured() {
        warn!("JWT_SECRET is not set; person requests will fail with 500 until it is");
    }

    let state = init_app_state(&db_config, jwt_config, tracer).await?;
    let app = init_router(state);

    let address = server_config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Server running");
    info!("OpenAPI document at http://{}/api-docs/openapi.json", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received, draining connections");
}
