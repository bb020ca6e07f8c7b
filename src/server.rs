//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache selection, migrations, development token seeding,
//! and the Axum server lifecycle.

use crate::application::services::{AuthService, UrlService};
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::repositories::{TokenRepository, UrlRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    InMemoryTokenRepository, InMemoryUrlRepository, PgTokenRepository, PgUrlRepository,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type Stores = (Arc<dyn UrlRepository>, Arc<dyn TokenRepository>);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Stores (PostgreSQL with migrations, or in-memory)
/// - Cache (Redis, in-memory, or NullCache)
/// - Development API token, when configured
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (url_repository, token_repository) = connect_stores(&config).await?;
    let cache = connect_cache(&config).await;

    let auth_service = Arc::new(AuthService::new(
        token_repository,
        config.token_signing_secret.clone(),
    ));

    if let Some(token) = &config.dev_api_token {
        seed_dev_token(&auth_service, token, config.dev_api_token_owner).await?;
    }

    let url_service = Arc::new(UrlService::new(
        url_repository,
        RandomCodeGenerator::new(config.short_code_length),
        cache,
        config.url_service_options(),
    ));

    let state = AppState::new(url_service, auth_service, &config.base_url);

    let app = app_router(
        state,
        config.request_timeout(),
        &config.cors_options(),
        config.behind_proxy,
    );

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_stores(config: &Config) -> Result<Stores> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres storage backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;

            let pool = Arc::new(pool);
            let urls: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(pool.clone()));
            let tokens: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool));
            Ok((urls, tokens))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let urls: Arc<dyn UrlRepository> = Arc::new(InMemoryUrlRepository::new());
            let tokens: Arc<dyn TokenRepository> = Arc::new(InMemoryTokenRepository::new());
            Ok((urls, tokens))
        }
    }
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, config.redis_url.as_deref()) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl()).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (in-memory)");
            Arc::new(MemoryCache::new(config.cache_ttl()))
        }
        _ => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Registers `token` so it authenticates as `owner`, or as a fresh owner id.
///
/// A token that is already registered is left untouched.
async fn seed_dev_token(auth_service: &AuthService, token: &str, owner: Option<Uuid>) -> Result<()> {
    let owner_id = owner.unwrap_or_else(Uuid::new_v4);

    match auth_service.register_token(owner_id, "dev", token).await {
        Ok(_) => {
            tracing::info!(%owner_id, "Development API token registered");
            Ok(())
        }
        Err(e) if e.is_unique_violation() => {
            tracing::info!("Development API token already registered");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to register development API token: {e}")),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
