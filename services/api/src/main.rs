use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{health_check, init_pool};
use internmatch_api::{
    AppState,
    config::AppConfig,
    create_router,
    jwt::JwtService,
    repositories::PgStore,
    scoring::HttpScoringClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting internship API service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let jwt_service = JwtService::new(config.jwt)?;
    let scorer = HttpScoringClient::new(config.scoring)?;
    let store = PgStore::new(pool);

    let app_state = AppState::new(Arc::new(store), jwt_service, Arc::new(scorer));

    // Start the web server
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down API service");
        })
        .await?;

    Ok(())
}
