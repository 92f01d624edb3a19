use std::sync::Arc;

use anyhow::Context;

use eventsphere_api::app::{self, services::AppServices};
use eventsphere_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    eventsphere_observability::init(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(build_services(&config).await?);
    let app = app::build_app_with(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory storage (data is lost on restart)");
        return Ok(AppServices::in_memory(config));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to postgres")?;
    eventsphere_infra::ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    tracing::info!("using postgres document store");
    Ok(AppServices::postgres(pool, config))
}

#[cfg(not(feature = "postgres"))]
async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but the binary was built without the `postgres` feature");
    }
    tracing::warn!("using in-memory storage (data is lost on restart)");
    Ok(AppServices::in_memory(config))
}
