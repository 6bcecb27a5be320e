use gymdesk::api::routes::create_routes;
use gymdesk::config::{run_migrations, AppConfig, DatabaseConfig, SmtpConfig};
use gymdesk::metrics::MetricsRegistry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let app_config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let smtp_config = SmtpConfig::from_env()?;

    let db = db_config.create_pool().await?;
    run_migrations(&db).await?;

    // Metrics live for the lifetime of the process and are injected into the
    // router rather than held in a global.
    let metrics = MetricsRegistry::new();

    let app = create_routes(db, &app_config, &db_config, &smtp_config, metrics)?;

    let listener = TcpListener::bind(app_config.server_address()).await?;
    info!("Gymdesk server starting on http://{}", app_config.server_address());
    info!("Health check available at /health");

    axum::serve(listener, app).await?;

    Ok(())
}
