use anyhow::Context;

use bankapi_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bankapi_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set; account creation and authenticated routes will fail");
    }

    let services = bankapi_api::app::build_services(&config).await?;
    let app = bankapi_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        store = config.store.name(),
        token_ttl_secs = ?config.token_ttl_secs,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
