use std::time::Duration;

use anyhow::Result;
use aws_config::BehaviorVersion;
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vidtube_api::{
    MIGRATOR,
    config::ServerConfig,
    jwt::{JwtConfig, JwtService},
    routes,
    state::AppState,
    storage::{MediaStorage, StorageConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let storage = MediaStorage::new(
        aws_sdk_s3::Client::new(&aws_config),
        StorageConfig::from_env(),
    );

    let address = server_config.bind_address();
    let state = AppState::new(pool, redis_pool, jwt_service, storage, server_config);

    let limiter = state.login_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(600));
        loop {
            ticker.tick().await;
            let pruned = limiter.prune().await;
            if pruned > 0 {
                info!("Pruned {} idle login limiter entries", pruned);
            }
        }
    });
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
