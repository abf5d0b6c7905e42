mod db;
mod error;
mod middleware;
mod repository;
mod routes;
mod site;
mod state;

use anyhow::Context;
use db::{create_pool, run_migrations};
use repository::{MemoryRepository, MemorySeed, PgRepository, SessionProvider};
use routes::create_router;
use site::SiteService;
use state::{AppState, Config, RepositoryBackend};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,site_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env().context("Invalid configuration")?);

    // Open the content repository
    let sessions: Arc<dyn SessionProvider> = match &config.backend {
        RepositoryBackend::Postgres {
            database_url,
            max_connections,
        } => {
            // Sanitize URL for logging (hide password)
            let url_for_logging = database_url
                .split('@')
                .last()
                .map(|host| format!("<hidden>@{}", host))
                .unwrap_or_else(|| "<invalid format>".to_string());

            tracing::info!("Connecting to repository database at {}...", url_for_logging);
            let db = create_pool(database_url, *max_connections)
                .await
                .with_context(|| format!("Failed to connect to database at {}", url_for_logging))?;

            tracing::info!("Running migrations...");
            run_migrations(&db).await.context("Failed to run migrations")?;

            Arc::new(PgRepository::new(db))
        }
        RepositoryBackend::Memory { seed } => {
            let repo = match seed {
                Some(path) => MemoryRepository::from_file(path).await?,
                None => {
                    tracing::warn!("REPOSITORY_SEED not set, starting with an empty repository");
                    MemoryRepository::new(MemorySeed::default())
                }
            };
            Arc::new(repo)
        }
    };

    // Create services
    let site_service = SiteService::new(sessions, config.dedup_sites);

    // Create application state
    let state = AppState {
        config: config.clone(),
        site_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.addr();

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
