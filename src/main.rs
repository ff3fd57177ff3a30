//! Facility Desk - maintenance ticketing backend.
//!
//! Serves the JSON API over a SQLite store.

use tokio::net::TcpListener;

use facility_desk::api::build_router;
use facility_desk::config::Config;
use facility_desk::logging;
use facility_desk::storage::DeskRepository;
use facility_desk::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Facility Desk v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        database = %config.database.url,
        auth_enabled = %config.auth.enabled,
        default_role = %config.auth.default_role,
        "Configuration loaded"
    );

    let repository = DeskRepository::connect(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            anyhow::anyhow!("Database connection error: {}", e)
        })?;
    repository.init_schema().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database schema");
        anyhow::anyhow!("Schema initialization error: {}", e)
    })?;

    tracing::info!("Database connected and schema initialized");

    let state = AppState::new(repository, &config.auth).await?;

    if let Some(admin) = &config.auth.bootstrap_admin {
        state.users.ensure_bootstrap_admin(admin).await?;
    }

    if !config.auth.enabled {
        tracing::warn!("Authentication is DISABLED - enable for production");
    }

    let app = build_router(state, config.auth.enabled);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
