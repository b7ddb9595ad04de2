use anyhow::Result;
use tracing::{info, warn};

use property_manager_web::{app, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);

    info!("Starting Property Manager v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = middleware::init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed; /metrics will be unavailable");
    }

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let outcome = services::admin_bootstrap::bootstrap_admin(&pool, &config.admin).await?;
    info!(?outcome, "Administrator bootstrap finished");

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
