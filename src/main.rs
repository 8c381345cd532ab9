mod auth;
mod db;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;
mod sweep;

use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config, StoreBackend};
use std::sync::Arc;
use sweep::{start_sweep_scheduler, ExpirationSweeper, PgStore, RestStore, SweepStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,consult_sweeper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing platform URL or credential stops the process here
    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn SweepStore> = match &config.store {
        StoreBackend::Rest { url, service_key } => {
            tracing::info!("Using data platform REST endpoint at {}", url);
            Arc::new(RestStore::new(url, service_key)?)
        }
        StoreBackend::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let db = create_pool(database_url).await?;

            tracing::info!("Running migrations...");
            run_migrations(&db).await?;

            Arc::new(PgStore::new(db))
        }
    };

    let sweeper = ExpirationSweeper::new(
        store,
        config.expiration_window,
        config.alert_concurrency,
    );

    // In-process schedule, on top of the HTTP trigger
    let _scheduler = match config.sweep_schedule.as_deref() {
        Some(schedule) => Some(start_sweep_scheduler(sweeper.clone(), schedule).await?),
        None => None,
    };

    let state = AppState {
        config: config.clone(),
        sweeper,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
