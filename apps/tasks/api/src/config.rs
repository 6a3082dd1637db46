use axum_helpers::{CorsConfig, RateLimitConfig};
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_optional, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use domain_tasks::DEFAULT_CACHE_TTL;
use std::time::Duration;

pub use core_config::Environment;

/// Application-specific configuration
///
/// PostgreSQL and Redis are optional: without `DATABASE_URL` the API serves
/// an in-memory store seeded with sample tasks, and without `REDIS_URL` the
/// cache lives in-process.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: Option<PostgresConfig>,
    pub redis: Option<RedisConfig>,
    pub cache_ttl: Duration,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080

        let database = match env_optional("DATABASE_URL") {
            Some(_) => Some(PostgresConfig::from_env()?),
            None => None,
        };

        let redis = match env_optional("REDIS_URL").or_else(|| env_optional("REDIS_HOST")) {
            Some(_) => Some(RedisConfig::from_env()?),
            None => None,
        };

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            redis,
            cache_ttl: cache_ttl_from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            run_migrations: env_parse("RUN_MIGRATIONS", true)?,
        })
    }
}

/// `CACHE_TTL_SECS`, defaulting to ten minutes
fn cache_ttl_from_env() -> Result<Duration, ConfigError> {
    let secs = env_parse("CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::ParseError {
            key: "CACHE_TTL_SECS".to_string(),
            details: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
