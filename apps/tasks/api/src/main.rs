use axum_helpers::server::{RouterOptions, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_tasks::{
    CacheStore, InMemoryTaskRepository, MemoryCacheStore, PgTaskRepository, RedisCacheStore,
    TaskCache, TaskRepository, TaskService,
};
use migration::Migrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Initialize external connections concurrently; each one is optional
    let postgres_future = async {
        match config.database.clone() {
            Some(pg) => database::postgres::connect_from_config_with_retry(pg, None)
                .await
                .map(Some)
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e)),
            None => Ok(None),
        }
    };

    let redis_future = async {
        match config.redis.clone() {
            Some(redis) => database::redis::connect_from_config_with_retry(redis, None)
                .await
                .map(Some)
                .map_err(|e| eyre::eyre!("Redis connection failed: {}", e)),
            None => Ok(None),
        }
    };

    let (db, redis) = tokio::try_join!(postgres_future, redis_future)?;

    let repository: Arc<dyn TaskRepository> = match &db {
        Some(db) => {
            if config.run_migrations {
                database::postgres::run_migrations::<Migrator>(db, config.app.name).await?;
            }
            Arc::new(PgTaskRepository::new(db.clone()))
        }
        None => {
            warn!("DATABASE_URL not set, serving tasks from an in-memory store with sample data");
            Arc::new(InMemoryTaskRepository::with_sample_data())
        }
    };

    let cache_store: Arc<dyn CacheStore> = match &redis {
        Some(redis) => Arc::new(RedisCacheStore::new(redis.clone())),
        None => {
            warn!("REDIS_URL not set, caching tasks in-process");
            Arc::new(MemoryCacheStore::default())
        }
    };

    info!(ttl_secs = config.cache_ttl.as_secs(), "Task cache configured");
    let tasks = TaskService::new(repository, TaskCache::new(cache_store, config.cache_ttl));

    let state = AppState {
        config,
        tasks,
        db,
        redis,
    };

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    let options = RouterOptions {
        cors: state.config.cors.clone(),
        rate_limit: Some(state.config.rate_limit.clone()),
        swagger_ui: state.config.environment.is_development(),
    };

    // Health endpoints sit beside /api and share its middleware
    // - /health: liveness check with app name/version
    // - /ready: readiness check against the task store and cache
    let root_routes = health_router(state.config.app).merge(api::ready_router(state.clone()));

    // create_router adds docs/middleware to our composed routes
    let app =
        axum_helpers::create_router::<openapi::ApiDoc>(api_routes, root_routes, &options).await?;

    info!("Starting tasks API with production-ready shutdown (30s timeout)");

    // Connection handles move into the cleanup future
    let server_config = state.config.server.clone();
    let AppState { db, redis, .. } = state;

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30), // 30s graceful shutdown timeout
        async move {
            info!("Shutting down: closing connections");

            if let Some(db) = db {
                match db.close().await {
                    Ok(_) => info!("PostgreSQL connection closed successfully"),
                    Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
                }
            }

            // Redis ConnectionManager closes automatically on drop
            if let Some(redis) = redis {
                drop(redis);
                info!("Redis connection closed successfully");
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Tasks API shutdown complete");
    Ok(())
}
